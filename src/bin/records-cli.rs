use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "records-cli")]
#[command(about = "Command-line client for the student records API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3001")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all students, newest first
    List,
    /// Show one student
    Get { id: String },
    /// Add a student
    Add { name: String, marks: f64 },
    /// Replace a student's name and marks
    Update { id: String, name: String, marks: f64 },
    /// Delete a student
    Delete { id: String },
    /// Show the highest-scoring students
    Top {
        #[arg(short, long)]
        limit: Option<u32>,
    },
    /// Find students whose name starts with a prefix
    Search { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let request = match cli.command {
        Commands::List => client.get(format!("{base}/api/students")),
        Commands::Get { id } => client.get(format!("{base}/api/students/{id}")),
        Commands::Add { name, marks } => client
            .post(format!("{base}/api/students"))
            .json(&json!({ "name": name, "marks": marks })),
        Commands::Update { id, name, marks } => client
            .put(format!("{base}/api/students/{id}"))
            .json(&json!({ "name": name, "marks": marks })),
        Commands::Delete { id } => client.delete(format!("{base}/api/students/{id}")),
        Commands::Top { limit } => {
            let request = client.get(format!("{base}/api/top-performers"));
            match limit {
                Some(limit) => request.query(&[("limit", limit)]),
                None => request,
            }
        }
        Commands::Search { name } => client
            .get(format!("{base}/api/search"))
            .query(&[("name", name)]),
    };

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    match serde_json::from_str::<Value>(&text) {
        Ok(json) if status.is_success() => println!("{}", serde_json::to_string_pretty(&json)?),
        Ok(json) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("{}", serde_json::to_string_pretty(&json)?);
        }
        Err(_) => {
            eprintln!("Error: API returned status {}", status);
            eprintln!("Response: {}", text);
        }
    }
    Ok(())
}
