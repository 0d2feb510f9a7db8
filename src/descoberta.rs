// src/descoberta.rs
//
// Respondedor UDP de descoberta: os clientes da rede local mandam um datagrama
// de sondagem e recebem a URL do servidor, sem precisar configurar IP na mão.
// Tudo aqui é melhor-esforço; falha de bind só gera um aviso no log.

use tokio::net::UdpSocket;

const SONDA: &[u8] = b"ORCAMENTO_DISCOVERY";

pub async fn iniciar(porta: u16, porta_http: String) {
    let socket = match UdpSocket::bind(("0.0.0.0", porta)).await {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Descoberta UDP desabilitada (porta {}): {}", porta, e);
            return;
        }
    };
    tracing::info!("✅ Descoberta UDP escutando na porta {}", porta);

    let mut buf = [0u8; 1024];
    loop {
        let (n, origem) = match socket.recv_from(&mut buf).await {
            Ok(r) => r,
            Err(_) => continue,
        };
        if n == 0 || !buf[..n].windows(SONDA.len()).any(|j| j == SONDA) {
            continue;
        }
        let ip = local_ip_address::local_ip()
            .map(|ip| ip.to_string())
            .unwrap_or_else(|_| "127.0.0.1".to_string());
        let resposta = format!("{{\"url\":\"http://{}:{}\"}}", ip, porta_http);
        if let Err(e) = socket.send_to(resposta.as_bytes(), origem).await {
            tracing::warn!("Falha ao responder descoberta para {}: {}", origem, e);
        }
    }
}
