//! Gateway demo: drives the full order flow against an in-process
//! transport stub standing in for a real FIX engine.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use fixgate::prelude::*;
use tracing::info;

/// Transport stub that records outbound traffic and accepts every send.
#[derive(Default)]
struct LoopbackTransport {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl TransportHandle for LoopbackTransport {
    fn bind_templates(
        &self,
        providers: &HashMap<SocketAddr, Vec<TemplateMapping>>,
    ) -> std::result::Result<(), TransportError> {
        for (addr, templates) in providers {
            info!("binding {} templates on {}", templates.len(), addr);
        }
        Ok(())
    }

    fn start(&self) -> std::result::Result<(), TransportError> {
        info!("loopback transport started");
        Ok(())
    }

    fn stop(&self) {
        info!("loopback transport stopped");
    }

    fn send(&self, message: OutboundMessage, key: &SessionKey) -> bool {
        info!("sending {} on {}", message.kind(), key);
        self.sent.lock().expect("poisoned").push(message);
        true
    }

    fn sessions(&self) -> Vec<SessionKey> {
        Vec::new()
    }

    fn request_logon(&self, key: &SessionKey) {
        info!("re-driving logon for {}", key);
    }
}

#[tokio::main]
async fn main() -> fixgate::core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let transport = Arc::new(LoopbackTransport::default());
    let gateway = GatewayBuilder::new()
        .with_config(
            GatewayConfig::new()
                .add_session(SessionSection::initiator("FIX.4.4", "CLIENT", "GATEWAY")),
        )
        .with_transport(transport)
        .build();

    gateway.start()?;

    // Simulate the transport's lifecycle callbacks for one session.
    let session = SessionKey::new(
        "FIX.4.4",
        CompId::new("CLIENT").expect("valid comp id"),
        CompId::new("GATEWAY").expect("valid comp id"),
    );
    let app = gateway.application();
    app.on_create(&session).await;
    app.on_logon(&session).await;

    // Submit an order and walk it through its execution reports.
    let cl_ord_id = gateway.submit_new_order(NewOrderCommand::market(
        session.clone(),
        ClOrdId::new("IT001").expect("valid order id"),
        "BTC",
        Side::Buy,
        rust_decimal::Decimal::ZERO,
    ))?;
    info!("submitted {cl_ord_id}, status {:?}", gateway.orders().status_of(&cl_ord_id));

    for status in [OrdStatus::New, OrdStatus::Filled] {
        let report = ExecutionReport {
            cl_ord_id: Some(cl_ord_id.clone()),
            order_id: Some("ORD-000001".to_string()),
            exec_id: format!("EXEC-{}", status.as_char()),
            exec_type: ExecType::New,
            ord_status: status,
            symbol: "BTC".to_string(),
            side: Side::Buy,
            leaves_qty: rust_decimal::Decimal::ZERO,
            cum_qty: rust_decimal::Decimal::ZERO,
            avg_px: rust_decimal::Decimal::ZERO,
            text: None,
            transact_time: Timestamp::now(),
        };
        let _ = app
            .from_app(&AppMessage::ExecutionReport(report), &session)
            .await;
        info!("status now {:?}", gateway.orders().status_of(&cl_ord_id));
    }

    gateway.stop();
    Ok(())
}
