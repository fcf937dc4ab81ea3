//! Validate RTE application credentials the way a configuration form would.

use std::process::ExitCode;

use tempo_demos::{credentials_from_env, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let Some((id, secret)) = credentials_from_env() else {
        eprintln!("set RTE_CLIENT_ID and RTE_CLIENT_SECRET");
        return ExitCode::from(2);
    };
    match tempo::test_credentials(&id, &secret).await {
        Ok(()) => {
            println!("credentials accepted");
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}: {e}", e.reason_key());
            ExitCode::FAILURE
        }
    }
}
