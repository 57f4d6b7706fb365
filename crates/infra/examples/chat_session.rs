//! Interactive chat against a running endpoint.
//!
//! ```bash
//! PARLEY_BASE_URL=http://localhost:3000 cargo run -p parley-infra --example chat_session
//! ```
//!
//! Reads lines from stdin and prints each reply. An empty line exits.

use std::io::{self, BufRead, Write};

use parley_infra::{config, init_tracing, ChatSession, LogFormat};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing("warn,parley_core=info", LogFormat::Compact)?;

    let config = config::load()?;
    let session = ChatSession::connect(&config)?;
    let conversation = session.conversation().with_system("You are a concise assistant.");

    println!("Connected to {} as {}", config.base_url, config.subject);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }

        match conversation.send(line.trim()).await {
            Ok(reply) => println!("{reply}"),
            Err(failure) => eprintln!("{failure} (input kept: {:?})", failure.input),
        }
    }

    let info = session.credentials().describe_credential();
    println!("Credential at exit: present={}, expires_at={:?}", info.present, info.expires_at);
    Ok(())
}
