use anyhow::{bail, Context};
use score_client::{types::Environment, ApiResponse, ClientError, HttpClient};
use serde_json::{json, Value};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

const USAGE: &str = "usage: score-client get <url> | score-client post <url> <json>";

/// A single call requested on the command line
#[derive(Debug, PartialEq)]
enum Command {
    Get { url: String },
    Post { url: String, body: Value },
}

fn parse_command(args: &[String]) -> anyhow::Result<Command> {
    match args {
        [method, url] if method == "get" => Ok(Command::Get { url: url.clone() }),
        [method, url, body] if method == "post" => {
            let body = serde_json::from_str(body).context("request body is not valid JSON")?;
            Ok(Command::Post {
                url: url.clone(),
                body,
            })
        }
        _ => bail!(USAGE),
    }
}

async fn run(client: &HttpClient, command: &Command) -> Result<ApiResponse, ClientError> {
    match command {
        Command::Get { url } => client.get(url).await,
        Command::Post { url, body } => client.post(url, body).await,
    }
}

/// A 4xx/5xx reply is still a completed call and renders like any other
fn render(response: &ApiResponse) -> Value {
    json!({
        "status": response.status.as_u16(),
        "data": response.data,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // Logs go to stderr so stdout carries only the response
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = parse_command(&args)?;

    let client = HttpClient::build(Environment::request_timeout())?;
    let response = run(&client, &command).await?;

    println!("{}", serde_json::to_string_pretty(&render(&response))?);

    Ok(())
}
