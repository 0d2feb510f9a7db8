// src/db/postgres.rs
//
// Variante relacional do Storage. As colunas de negócio são texto no formato
// pt-BR (como sempre foram na planilha); as views tipadas fazem a conversão
// para ferramentas analíticas. Consultas em tempo de execução porque o schema
// é criado no boot, sem diretório de migrações.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Column, PgPool, Row};

use crate::common::error::AppError;
use crate::db::mapeamento::{self, Registro};
use crate::db::{filtrar_por_data, Filtro, Storage};
use crate::domain::documentos::apenas_digitos;
use crate::models::usuario::{Usuario, UsuarioIn, UsuarioPublico};

#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

// DDL idempotente, executado statement a statement no boot.
const DDL: &[&str] = &[
    r#"
    create table if not exists orcamentos (
        id_orcamento text primary key,
        data_hora text,
        tipo_servico text,
        cliente_label text,
        cliente_valor text,
        documento text,
        cnpj_cpf text,
        email text,
        vendedor text,
        desconto text,
        quantidade text,
        unidade text,
        metros text,
        preco_por_metro text,
        forma_pagamento text,
        valor_total text
    )
    "#,
    r#"
    create table if not exists cadastros (
        cnpj_cpf text primary key,
        documento text,
        razao_social_nome text,
        nome_fantasia text,
        contato text,
        email_cnpj text,
        email_manual text,
        cep text,
        endereco text,
        numero text,
        complemento text,
        bairro text,
        municipio text,
        uf text,
        entrega_cep text,
        entrega_endereco text,
        entrega_numero text,
        entrega_complemento text,
        entrega_bairro text,
        entrega_municipio text,
        entrega_uf text,
        desconto_duracao text,
        desconto_unidade text,
        telefone1 text,
        telefone2 text,
        vendedor text,
        criado_em text,
        atualizado_em text
    )
    "#,
    r#"
    create table if not exists pedidos (
        id text primary key,
        pedido bigint,
        tipo_servico text,
        status_cliente text,
        quantidade_m text,
        valor_unitario text,
        valor_total text,
        data_hora_criacao text,
        id_orcamento text,
        documento text,
        cnpj_cpf text,
        cliente text,
        vendedor text,
        forma_pgto_orcamento text,
        forma_pgto_contrato text,
        pct_comissao_vendedor text,
        valor_comissao_vendedor text,
        pct_comissao_adm text,
        valor_comissao_adm text
    )
    "#,
    r#"
    create table if not exists usuarios (
        usuario text primary key,
        nome text,
        email text,
        setor text,
        cargo text,
        senha_hash text,
        is_admin boolean not null default false,
        permissoes text
    )
    "#,
    // Contador atômico de sequências (substitui a contagem por varredura,
    // que corria entre dois chamadores concorrentes).
    r#"
    create table if not exists sequencias (
        nome text primary key,
        valor bigint not null
    )
    "#,
    // Índices funcionais pelo documento só-dígitos: a coluna guarda o
    // documento pontuado e as buscas chegam em dígitos.
    r"create index if not exists idx_orc_cnpj on orcamentos((regexp_replace(cnpj_cpf,'\D','','g')))",
    r"create index if not exists idx_cad_cnpj on cadastros((regexp_replace(cnpj_cpf,'\D','','g')))",
    r"create index if not exists idx_ped_cnpj on pedidos((regexp_replace(cnpj_cpf,'\D','','g')))",
    // Views tipadas (somente leitura) para Power Query e afins.
    r#"
    create or replace view vw_orcamentos_typed as
    select
      id_orcamento,
      to_timestamp(nullif(data_hora,''),'DD/MM/YYYY HH24:MI:SS') as data_hora_ts,
      tipo_servico, cliente_label, cliente_valor, documento, cnpj_cpf, email, vendedor, desconto,
      nullif(replace(replace(quantidade,'.',''),',','.'),'')::numeric as quantidade_num,
      unidade,
      nullif(replace(replace(metros,'.',''),',','.'),'')::numeric as metros_num,
      nullif(replace(replace(preco_por_metro,'.',''),',','.'),'')::numeric as preco_num,
      forma_pagamento,
      nullif(replace(replace(valor_total,'.',''),',','.'),'')::numeric as valor_total_num
    from orcamentos
    "#,
    r#"
    create or replace view vw_pedidos_typed as
    select
      id, pedido,
      to_timestamp(nullif(data_hora_criacao,''),'DD/MM/YYYY HH24:MI:SS') as data_hora_ts,
      tipo_servico, status_cliente,
      nullif(replace(replace(quantidade_m,'.',''),',','.'),'')::numeric as quantidade_m_num,
      nullif(replace(replace(valor_unitario,'.',''),',','.'),'')::numeric as valor_unitario_num,
      nullif(replace(replace(valor_total,'.',''),',','.'),'')::numeric as valor_total_num,
      id_orcamento, documento, cnpj_cpf, cliente, vendedor,
      forma_pgto_orcamento, forma_pgto_contrato,
      pct_comissao_vendedor, valor_comissao_vendedor,
      pct_comissao_adm, valor_comissao_adm
    from pedidos
    "#,
];

// Semeia os contadores a partir dos dados já existentes (migração de uma base
// que nasceu na era da contagem por varredura). `do nothing` preserva o
// contador quando ele já existe.
const SEED_SEQUENCIAS: &[&str] = &[
    r#"
    insert into sequencias (nome, valor)
    select 'pedido', coalesce(max(pedido), 0) from pedidos
    on conflict (nome) do nothing
    "#,
    r#"
    insert into sequencias (nome, valor)
    select 'orcamento_im', count(*) from orcamentos where id_orcamento like 'OR-IM%'
    on conflict (nome) do nothing
    "#,
    r#"
    insert into sequencias (nome, valor)
    select 'orcamento_dg', count(*) from orcamentos where id_orcamento like 'OR-DG%'
    on conflict (nome) do nothing
    "#,
];

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn conectar(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(std::time::Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(|e| {
                AppError::BackendIndisponivel(format!("Falha ao conectar ao banco: {}", e))
            })?;
        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Ok(Self::new(pool))
    }

    /// Incremento atômico; cria o contador em 1 na primeira utilização.
    async fn incrementar_sequencia(&self, nome: &str) -> Result<i64, AppError> {
        let row = sqlx::query(
            r#"
            insert into sequencias (nome, valor) values ($1, 1)
            on conflict (nome) do update set valor = sequencias.valor + 1
            returning valor
            "#,
        )
        .bind(nome)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get::<i64, _>("valor")?)
    }

    async fn listar_tabela(
        &self,
        tabela: &str,
        ordenacao: &str,
        filtro: &Filtro,
        mapa: &mapeamento::Mapeamento,
        campo_data: &str,
    ) -> Result<Vec<Registro>, AppError> {
        let mut qb = sqlx::QueryBuilder::new(format!("select * from {}", tabela));
        let mut tem_where = false;
        if let Some(v) = filtro.vendedor.as_deref().filter(|v| !v.is_empty()) {
            qb.push(" where coalesce(vendedor,'') ilike ");
            qb.push_bind(format!("%{}%", v));
            tem_where = true;
        }
        if let Some(d) = filtro.documento_digitos.as_deref().filter(|d| !d.is_empty()) {
            qb.push(if tem_where { " and " } else { " where " });
            qb.push(r"regexp_replace(cnpj_cpf,'\D','','g') = ");
            qb.push_bind(apenas_digitos(d));
        }
        qb.push(format!(" order by {} desc", ordenacao));

        let rows = qb.build().fetch_all(&self.pool).await?;
        let registros: Vec<Registro> = rows
            .iter()
            .map(|r| mapa.para_labels(&linha_para_colunas(r)))
            .collect();

        // Intervalo de datas: predicado único pós-consulta (colunas de data
        // são texto DD/MM/YYYY; filtrar no SQL exigiria parse por dialeto).
        Ok(filtrar_por_data(
            registros,
            campo_data,
            filtro.inicio.as_deref(),
            filtro.fim.as_deref(),
        ))
    }
}

fn linha_para_colunas(row: &PgRow) -> HashMap<String, String> {
    let mut mapa = HashMap::new();
    for col in row.columns() {
        let nome = col.name();
        let valor = if let Ok(v) = row.try_get::<Option<String>, _>(nome) {
            v.unwrap_or_default()
        } else if let Ok(v) = row.try_get::<Option<i64>, _>(nome) {
            v.map(|n| n.to_string()).unwrap_or_default()
        } else if let Ok(v) = row.try_get::<Option<bool>, _>(nome) {
            v.map(|b| b.to_string()).unwrap_or_default()
        } else {
            String::new()
        };
        mapa.insert(nome.to_string(), valor);
    }
    mapa
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn preparar_esquema(&self) -> Result<(), AppError> {
        for stmt in DDL {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        for stmt in SEED_SEQUENCIAS {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        tracing::info!("✅ Esquema do banco preparado (tabelas, índices, views, sequências).");
        Ok(())
    }

    async fn salvar_orcamento(&self, registro: &Registro) -> Result<(), AppError> {
        let payload = mapeamento::ORCAMENTOS.para_colunas(registro);
        let colunas = mapeamento::ORCAMENTOS.colunas();
        let mut qb = sqlx::QueryBuilder::new("insert into orcamentos (");
        qb.push(colunas.join(", "));
        qb.push(") values (");
        let mut separated = qb.separated(", ");
        for col in &colunas {
            separated.push_bind(payload.get(col).cloned().unwrap_or_default());
        }
        // Orçamento re-salvo com o mesmo id só renova o carimbo de data/hora:
        // o histórico é tratado como append-mostly.
        qb.push(") on conflict (id_orcamento) do update set data_hora = excluded.data_hora");
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn orcamento_por_id(&self, id: &str) -> Result<Option<Registro>, AppError> {
        let row = sqlx::query("select * from orcamentos where id_orcamento = $1 limit 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| mapeamento::ORCAMENTOS.para_labels(&linha_para_colunas(&r))))
    }

    async fn listar_orcamentos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        self.listar_tabela("orcamentos", "data_hora", filtro, &mapeamento::ORCAMENTOS, "Data/Hora")
            .await
    }

    async fn salvar_cadastro(&self, registro: &Registro) -> Result<(), AppError> {
        let mut payload = mapeamento::CADASTROS.para_colunas(registro);
        // Chave primária sempre normalizada para dígitos.
        let digitos = apenas_digitos(payload.get("cnpj_cpf").map(String::as_str).unwrap_or(""));
        payload.insert("cnpj_cpf", digitos);
        let agora = chrono::Local::now().format("%d/%m/%Y %H:%M:%S").to_string();
        if payload.get("criado_em").map(|v| v.is_empty()).unwrap_or(true) {
            payload.insert("criado_em", agora.clone());
        }
        payload.insert("atualizado_em", agora);

        let colunas = mapeamento::CADASTROS.colunas();
        let mut qb = sqlx::QueryBuilder::new("insert into cadastros (");
        qb.push(colunas.join(", "));
        qb.push(") values (");
        let mut separated = qb.separated(", ");
        for col in &colunas {
            separated.push_bind(payload.get(col).cloned().unwrap_or_default());
        }
        // Atualiza tudo, menos o carimbo de criação.
        qb.push(") on conflict (cnpj_cpf) do update set ");
        let mut primeiro = true;
        for col in &colunas {
            if *col == "cnpj_cpf" || *col == "criado_em" {
                continue;
            }
            if !primeiro {
                qb.push(", ");
            }
            qb.push(format!("{c} = excluded.{c}", c = col));
            primeiro = false;
        }
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn cadastro_por_documento(&self, digitos: &str) -> Result<Option<Registro>, AppError> {
        let row = sqlx::query(
            r"select * from cadastros
              where regexp_replace(cnpj_cpf,'\D','','g') = $1
              order by atualizado_em desc limit 1",
        )
        .bind(apenas_digitos(digitos))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| mapeamento::CADASTROS.para_labels(&linha_para_colunas(&r))))
    }

    async fn listar_cadastros(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        self.listar_tabela(
            "cadastros",
            "atualizado_em",
            filtro,
            &mapeamento::CADASTROS,
            "Atualizado em",
        )
        .await
    }

    async fn salvar_pedido(&self, registro: &Registro) -> Result<(), AppError> {
        let mut payload = mapeamento::PEDIDOS.para_colunas(registro);
        let digitos = apenas_digitos(payload.get("cnpj_cpf").map(String::as_str).unwrap_or(""));
        payload.insert("cnpj_cpf", digitos);
        let numero: i64 = payload
            .get("pedido")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);

        let colunas = mapeamento::PEDIDOS.colunas();
        let mut qb = sqlx::QueryBuilder::new("insert into pedidos (");
        qb.push(colunas.join(", "));
        qb.push(") values (");
        let mut separated = qb.separated(", ");
        for col in &colunas {
            if *col == "pedido" {
                separated.push_bind(numero);
            } else {
                separated.push_bind(payload.get(col).cloned().unwrap_or_default());
            }
        }
        qb.push(") on conflict (id) do nothing");
        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn listar_pedidos(&self, filtro: &Filtro) -> Result<Vec<Registro>, AppError> {
        self.listar_tabela(
            "pedidos",
            "data_hora_criacao",
            filtro,
            &mapeamento::PEDIDOS,
            "Data/Hora da criação do pedido",
        )
        .await
    }

    async fn ultimo_pedido_data(&self, digitos: &str) -> Result<Option<String>, AppError> {
        let rows = sqlx::query(
            r"select data_hora_criacao from pedidos
              where regexp_replace(cnpj_cpf,'\D','','g') = $1",
        )
        .bind(apenas_digitos(digitos))
        .fetch_all(&self.pool)
        .await?;
        // A coluna é texto DD/MM/YYYY HH:MM:SS; o máximo lexicográfico não é o
        // máximo cronológico, então o parse acontece aqui.
        let mut melhor: Option<(chrono::NaiveDateTime, String)> = None;
        for row in rows {
            let texto: Option<String> = row.try_get("data_hora_criacao")?;
            let Some(texto) = texto.filter(|t| !t.is_empty()) else {
                continue;
            };
            if let Ok(dt) =
                chrono::NaiveDateTime::parse_from_str(&texto, "%d/%m/%Y %H:%M:%S")
            {
                if melhor.as_ref().map(|(m, _)| dt > *m).unwrap_or(true) {
                    melhor = Some((dt, texto));
                }
            }
        }
        Ok(melhor.map(|(_, texto)| texto))
    }

    async fn proximo_numero_pedido(&self) -> Result<i64, AppError> {
        self.incrementar_sequencia("pedido").await
    }

    async fn proximo_sequencial_orcamento(&self, sigla: &str) -> Result<i64, AppError> {
        let nome = format!("orcamento_{}", sigla.to_lowercase());
        self.incrementar_sequencia(&nome).await
    }

    async fn upsert_usuario(
        &self,
        u: &UsuarioIn,
        senha_hash: Option<String>,
    ) -> Result<(), AppError> {
        match senha_hash {
            Some(hash) => {
                sqlx::query(
                    r#"
                    insert into usuarios (usuario, nome, email, setor, cargo, senha_hash, is_admin, permissoes)
                    values ($1, $2, $3, $4, $5, $6, $7, $8)
                    on conflict (usuario) do update set
                        nome = excluded.nome, email = excluded.email, setor = excluded.setor,
                        cargo = excluded.cargo, senha_hash = excluded.senha_hash,
                        is_admin = excluded.is_admin, permissoes = excluded.permissoes
                    "#,
                )
                .bind(&u.usuario)
                .bind(&u.nome)
                .bind(&u.email)
                .bind(&u.setor)
                .bind(&u.cargo)
                .bind(hash)
                .bind(u.is_admin)
                .bind(&u.permissoes)
                .execute(&self.pool)
                .await?;
            }
            // Sem senha nova: preserva o hash existente.
            None => {
                sqlx::query(
                    r#"
                    insert into usuarios (usuario, nome, email, setor, cargo, is_admin, permissoes)
                    values ($1, $2, $3, $4, $5, $6, $7)
                    on conflict (usuario) do update set
                        nome = excluded.nome, email = excluded.email, setor = excluded.setor,
                        cargo = excluded.cargo, is_admin = excluded.is_admin,
                        permissoes = excluded.permissoes
                    "#,
                )
                .bind(&u.usuario)
                .bind(&u.nome)
                .bind(&u.email)
                .bind(&u.setor)
                .bind(&u.cargo)
                .bind(u.is_admin)
                .bind(&u.permissoes)
                .execute(&self.pool)
                .await?;
            }
        }
        Ok(())
    }

    async fn listar_usuarios(&self) -> Result<Vec<UsuarioPublico>, AppError> {
        let usuarios = sqlx::query_as::<_, UsuarioPublico>(
            r#"
            select usuario, nome, email, setor, cargo, is_admin,
                   coalesce(permissoes, '') as permissoes
            from usuarios order by usuario
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(usuarios)
    }

    async fn usuario_por_nome(&self, usuario: &str) -> Result<Option<Usuario>, AppError> {
        let u = sqlx::query_as::<_, Usuario>(
            r#"
            select usuario, nome, email, setor, cargo, senha_hash, is_admin, permissoes
            from usuarios where usuario = $1
            "#,
        )
        .bind(usuario)
        .fetch_optional(&self.pool)
        .await?;
        Ok(u)
    }

    async fn definir_senha(&self, usuario: &str, senha_hash: &str) -> Result<(), AppError> {
        let resultado = sqlx::query("update usuarios set senha_hash = $1 where usuario = $2")
            .bind(senha_hash)
            .bind(usuario)
            .execute(&self.pool)
            .await?;
        if resultado.rows_affected() == 0 {
            return Err(AppError::NaoEncontrado(format!(
                "Usuário '{}' não encontrado.",
                usuario
            )));
        }
        Ok(())
    }
}
