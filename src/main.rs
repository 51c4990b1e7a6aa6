use meshtastic_send::cli;

#[tokio::main]
async fn main() {
    // 130 mirrors the conventional exit status for SIGINT.
    let code = tokio::select! {
        code = cli::run() => code,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("operation cancelled by user");
            130
        }
    };
    std::process::exit(code);
}
