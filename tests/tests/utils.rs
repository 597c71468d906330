use loadpulse_core::{HttpMethod, HttpTarget, RunConfig, TargetParams, TerminationPolicy};
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub const MOCK_ADDR: &str = "0.0.0.0:3010";

/// Start the shared mock target (and logging) once per test binary.
#[allow(unused)]
pub async fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    let wait = ONCE_LOCK.get().is_none();

    ONCE_LOCK.get_or_init(|| {
        let _ = FmtSubscriber::builder()
            .with_env_filter("loadpulse=debug,mock_service=debug")
            .try_init();

        // Each #[tokio::test] gets its own runtime that shuts down with
        // the test, so the shared mock must live on its own runtime in a
        // dedicated thread to survive across tests.
        std::thread::spawn(|| {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let addr: SocketAddr = MOCK_ADDR.parse().unwrap();
                mock_service::run(addr).await;
            });
        });
    });

    if wait {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
}

#[allow(unused)]
pub fn http_config(
    path: &str,
    virtual_users: u32,
    termination: TerminationPolicy,
    ramp_up: Duration,
) -> RunConfig {
    RunConfig {
        virtual_users,
        termination,
        ramp_up,
        target: TargetParams::Http(HttpTarget {
            url: format!("http://{}{path}", MOCK_ADDR.replace("0.0.0.0", "127.0.0.1")),
            method: HttpMethod::Get,
            body: None,
        }),
    }
}
