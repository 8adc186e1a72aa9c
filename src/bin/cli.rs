use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const API_URL: &str = "http://localhost:9000/api";
const SESSION_FILE: &str = ".session";

#[derive(Parser)]
#[command(name = "docshare")]
#[command(about = "A CLI client for the document sharing service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Register a new account")]
    Register {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Credential (password)")]
        credential: String,

        #[arg(short, long, help = "Role: admin, hr, or employee")]
        role: String,
    },

    #[command(about = "Log in to the service")]
    Login {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Credential (password)")]
        credential: String,
    },

    #[command(about = "Log out of the service")]
    Logout,

    #[command(about = "Show current user")]
    Whoami,

    #[command(about = "Upload document metadata")]
    Upload {
        #[arg(short, long, help = "Document title")]
        title: String,

        #[arg(short, long, help = "Document URL")]
        url: String,

        #[arg(short, long, help = "Short summary", default_value = "")]
        summary: String,
    },

    #[command(about = "List shared documents, newest first")]
    List,

    #[command(about = "Show one document by ID")]
    Show {
        #[arg(short, long, help = "Document ID")]
        id: String,
    },
}

// Login is a single stateless check; the service issues no token. The client
// keeps the identity and role locally and re-presents them on upload.
#[derive(Debug, Serialize, Deserialize)]
struct Session {
    username: String,
    role: String,
}

impl Session {
    fn save(&self) -> Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(SESSION_FILE, json)?;
        Ok(())
    }

    fn load() -> Option<Self> {
        if Path::new(SESSION_FILE).exists() {
            let data = fs::read_to_string(SESSION_FILE).ok()?;
            serde_json::from_str(&data).ok()
        } else {
            None
        }
    }

    fn clear() -> Result<()> {
        if Path::new(SESSION_FILE).exists() {
            fs::remove_file(SESSION_FILE)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct RegisterRequest {
    username: String,
    credential: String,
    role: String,
}

#[derive(Debug, Serialize)]
struct LoginRequest {
    username: String,
    credential: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadDocumentRequest {
    title: String,
    url: String,
    summary: String,
    uploaded_by: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    username: String,
    role: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    message: String,
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    id: String,
    title: String,
    url: String,
    summary: String,
    uploaded_by: String,
    uploaded_at: String,
}

#[derive(Debug, Deserialize)]
struct UploadDocumentResponse {
    message: String,
    document: Document,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run_command(cli.command).await {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Register {
            username,
            credential,
            role,
        } => register(username, credential, role).await,
        Commands::Login {
            username,
            credential,
        } => login(username, credential).await,
        Commands::Logout => logout(),
        Commands::Whoami => whoami(),
        Commands::Upload {
            title,
            url,
            summary,
        } => {
            let session = require_login()?;
            upload(&session, title, url, summary).await
        }
        Commands::List => list().await,
        Commands::Show { id } => show(id).await,
    }
}

async fn register(username: String, credential: String, role: String) -> Result<()> {
    let client = reqwest::Client::new();

    let payload = RegisterRequest {
        username: username.clone(),
        credential,
        role,
    };

    let response = client
        .post(format!("{}/register", API_URL))
        .json(&payload)
        .send()
        .await
        .context("Failed to connect to the document service. Is the server running?")?;

    if !response.status().is_success() {
        bail!("Registration failed: {}", error_detail(response).await);
    }

    let result: MessageResponse = response.json().await?;

    println!("✅ {}", result.message);
    println!("👤 Username: {}", username);
    println!("\n💡 You can now log in using: docshare login -u {} -c <credential>", username);

    Ok(())
}

async fn login(username: String, credential: String) -> Result<()> {
    let client = reqwest::Client::new();

    let payload = LoginRequest {
        username,
        credential,
    };

    let response = client
        .post(format!("{}/login", API_URL))
        .json(&payload)
        .send()
        .await
        .context("Failed to connect to the document service. Is the server running?")?;

    if !response.status().is_success() {
        bail!("Login failed: {}", error_detail(response).await);
    }

    let result: LoginResponse = response.json().await?;

    let session = Session {
        username: result.user.username.clone(),
        role: result.user.role.clone(),
    };
    session.save()?;

    println!("✅ {}", result.message);
    println!("👤 Welcome back, {}! ({})", result.user.username, result.user.role);

    Ok(())
}

fn logout() -> Result<()> {
    Session::clear()?;
    println!("✅ Logged out successfully!");
    Ok(())
}

fn whoami() -> Result<()> {
    if let Some(session) = Session::load() {
        println!("👤 Logged in as: {}", session.username);
        println!("🎭 Role: {}", session.role);
    } else {
        println!("❌ Not logged in");
        println!("💡 Use 'docshare login -u <username> -c <credential>' to log in");
    }
    Ok(())
}

async fn upload(session: &Session, title: String, url: String, summary: String) -> Result<()> {
    let client = reqwest::Client::new();

    let payload = UploadDocumentRequest {
        title,
        url,
        summary,
        uploaded_by: session.username.clone(),
    };

    let response = client
        .post(format!("{}/documents", API_URL))
        .json(&payload)
        .send()
        .await
        .context("Failed to connect to the document service. Is the server running?")?;

    if !response.status().is_success() {
        bail!("Upload failed: {}", error_detail(response).await);
    }

    let result: UploadDocumentResponse = response.json().await?;

    println!("✅ {}", result.message);
    println!("📄 Title: {}", result.document.title);
    println!("🔗 URL: {}", result.document.url);
    println!("🆔 Document ID: {}", result.document.id);
    println!("\n💡 Use 'docshare list' to see all shared documents");

    Ok(())
}

async fn list() -> Result<()> {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/documents", API_URL))
        .send()
        .await
        .context("Failed to connect to the document service. Is the server running?")?;

    if !response.status().is_success() {
        bail!("Failed to fetch documents: {}", error_detail(response).await);
    }

    let documents: Vec<Document> = response.json().await?;

    if documents.is_empty() {
        println!("📭 No documents shared yet.");
        println!("💡 Use 'docshare upload' to share document metadata");
        return Ok(());
    }

    println!("\n📚 Shared Documents ({})\n", documents.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Title"),
        Cell::new("Uploaded By"),
        Cell::new("Uploaded At"),
    ]));

    for document in documents {
        let uploaded_dt: DateTime<Utc> = document.uploaded_at.parse()?;
        let local_time = uploaded_dt.with_timezone(&Local);

        table.add_row(Row::new(vec![
            Cell::new(&document.id[..8]),
            Cell::new(&document.title),
            Cell::new(&document.uploaded_by),
            Cell::new(&local_time.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]));
    }

    table.printstd();
    println!();

    Ok(())
}

async fn show(id: String) -> Result<()> {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/documents/{}", API_URL, id))
        .send()
        .await
        .context("Failed to connect to the document service. Is the server running?")?;

    if !response.status().is_success() {
        bail!("Failed to fetch document: {}", error_detail(response).await);
    }

    let document: Document = response.json().await?;

    let uploaded_dt: DateTime<Utc> = document.uploaded_at.parse()?;
    let local_time = uploaded_dt.with_timezone(&Local);

    println!("📄 {}", document.title);
    println!("🔗 URL: {}", document.url);
    println!("📝 Summary: {}", document.summary);
    println!("👤 Uploaded by: {}", document.uploaded_by);
    println!("⏰ Uploaded at: {}", local_time.format("%Y-%m-%d %H:%M:%S %Z"));
    println!("🆔 ID: {}", document.id);

    Ok(())
}

fn require_login() -> Result<Session> {
    Session::load()
        .ok_or_else(|| anyhow::anyhow!("You must be logged in. Use: docshare login -u <username> -c <credential>"))
}

async fn error_detail(response: reqwest::Response) -> String {
    response
        .json::<ErrorResponse>()
        .await
        .map(|e| e.error)
        .unwrap_or_else(|_| "Unknown error".to_string())
}
