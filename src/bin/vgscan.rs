//! `vgscan` — command line front end for the VietGuardScan portal.
//!
//! Covers the portal's user flows without a browser: upload an APK and
//! watch the scan, query status, download reports, run the OTP-gated
//! registration, and browse/export the admin tables.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use vietguard_portal::api::access_log::AccessLogClient;
use vietguard_portal::api::ip::lookup_client_ip;
use vietguard_portal::api::scan::ScanApiClient;
use vietguard_portal::config::AppConfig;
use vietguard_portal::export;
use vietguard_portal::models::access_log::{
    AccessLogQuery, RecordAccessRequest, SortField, SortOrder,
};
use vietguard_portal::models::member::{
    CreateMemberWithServiceRequest, ServiceSelection, SubmitUserInfoRequest,
};
use vietguard_portal::models::scan::{ScanResult, ScanStatusResponse};
use vietguard_portal::polling::{
    calculate_scan_progress, format_status_text, start_scan_polling, PollError,
};

#[derive(Parser)]
#[command(name = "vgscan", version, about = "VietGuardScan portal command line")]
struct Cli {
    /// Backend API base URL (overrides API_BASE_URL from the environment).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload an APK and poll the scan to completion.
    Scan {
        /// Path to the APK file.
        file: PathBuf,
        /// Member name recorded with the scan task.
        #[arg(long, default_value = "anonymous")]
        member: String,
        /// Attach the caller's public IPv4 address to the task.
        #[arg(long)]
        with_ip: bool,
        /// Seconds between status queries.
        #[arg(long)]
        interval: Option<u64>,
        /// Give up after this many status queries.
        #[arg(long)]
        max_attempts: Option<u32>,
        /// Download the report into this directory once the scan completes.
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
    /// Query a scan task's status once.
    Status {
        task_id: String,
    },
    /// Download the analysis report for a task.
    Report {
        task_id: String,
        /// Directory to save the report into.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// OTP-gated registration: request a code, verify it, submit contact info.
    Register {
        email: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        note: Option<String>,
    },
    /// List access logs.
    AccessLogs {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        limit: u32,
        #[arg(long, value_enum)]
        sort_by: Option<SortByArg>,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
        /// Filter rows by IP or email substring.
        #[arg(long)]
        search: Option<String>,
        /// Write the page as CSV instead of printing a table.
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        csv: Option<PathBuf>,
    },
    /// Aggregate access statistics.
    AccessCount,
    /// Show a member record by email.
    Member {
        email: String,
    },
    /// List member verifications.
    Members {
        /// Write the list as CSV instead of printing a table.
        #[arg(long, num_args = 0..=1, default_missing_value = "")]
        csv: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortByArg {
    Id,
    Ipv4,
    Ipv6,
    Email,
    AccessCount,
    LastAccessTime,
}

impl From<SortByArg> for SortField {
    fn from(arg: SortByArg) -> Self {
        match arg {
            SortByArg::Id => SortField::Id,
            SortByArg::Ipv4 => SortField::Ipv4,
            SortByArg::Ipv6 => SortField::Ipv6,
            SortByArg::Email => SortField::Email,
            SortByArg::AccessCount => SortField::AccessCount,
            SortByArg::LastAccessTime => SortField::LastAccessTime,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

impl From<OrderArg> for SortOrder {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Asc => SortOrder::Asc,
            OrderArg::Desc => SortOrder::Desc,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    if let Err(e) = run(cli, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let base_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| config.api_base_url.clone());

    match cli.command {
        Command::Scan {
            file,
            member,
            with_ip,
            interval,
            max_attempts,
            report_dir,
        } => {
            run_scan(
                &config, &base_url, file, member, with_ip, interval, max_attempts, report_dir,
            )
            .await
        }
        Command::Status { task_id } => {
            let client = ScanApiClient::new(&base_url);
            let response = client.get_scan_status(&task_id).await?;
            print_status_line(&response);
            Ok(())
        }
        Command::Report { task_id, out_dir } => {
            let client = ScanApiClient::new(&base_url);
            let path = client.download_report(&task_id, &out_dir).await?;
            println!("report saved to {}", path.display());
            Ok(())
        }
        Command::Register {
            email,
            full_name,
            company,
            phone,
            note,
        } => run_register(&base_url, email, full_name, company, phone, note).await,
        Command::AccessLogs {
            page,
            limit,
            sort_by,
            order,
            search,
            csv,
        } => {
            let client = AccessLogClient::new(&base_url);
            let query = AccessLogQuery {
                page: Some(page),
                limit: Some(limit),
                sort_by: sort_by.map(Into::into),
                sort_order: order.map(Into::into),
                search,
            };
            let response = client.get_access_logs(&query).await?;

            if let Some(path) = csv {
                let path = default_csv_path(path, "access-logs");
                std::fs::write(&path, export::access_logs_csv(&response.data))?;
                println!("wrote {}", path.display());
            } else {
                println!(
                    "{:<6} {:<16} {:<28} {:<30} {:>6}  {}",
                    "ID", "IPv4", "IPv6", "Email", "Count", "Last Access"
                );
                for log in &response.data {
                    println!(
                        "{:<6} {:<16} {:<28} {:<30} {:>6}  {}",
                        log.id,
                        log.ipv4.as_deref().unwrap_or("-"),
                        log.ipv6.as_deref().unwrap_or("-"),
                        log.email.as_deref().unwrap_or("-"),
                        log.access_count,
                        log.last_access_time.format("%Y-%m-%d %H:%M"),
                    );
                }
                println!(
                    "page {} of {} ({} rows total)",
                    response.page, response.total_pages, response.total
                );
            }
            Ok(())
        }
        Command::AccessCount => {
            let client = AccessLogClient::new(&base_url);
            let stats = client.get_access_count().await?;
            println!("visitors:      {}", stats.total);
            println!("unique IPs:    {}", stats.unique_ips);
            println!("total visits:  {}", stats.total_access_count);
            Ok(())
        }
        Command::Member { email } => {
            let client = ScanApiClient::new(&base_url);
            let member = client.get_member_by_email(&email).await?;
            println!("{}", serde_json::to_string_pretty(&member)?);
            Ok(())
        }
        Command::Members { csv } => {
            let client = ScanApiClient::new(&base_url);
            let members = client.member_verifications().await?;

            if let Some(path) = csv {
                let path = default_csv_path(path, "member-verifications");
                std::fs::write(&path, export::members_csv(&members))?;
                println!("wrote {}", path.display());
            } else {
                println!(
                    "{:<6} {:<24} {:<30} {:<20} {}",
                    "ID", "Name", "Email", "Phone", "Company"
                );
                for m in &members {
                    println!(
                        "{:<6} {:<24} {:<30} {:<20} {}",
                        m.id, m.full_name, m.member_email, m.phone, m.company_name
                    );
                }
                println!("{} verifications", members.len());
            }
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_scan(
    config: &AppConfig,
    base_url: &str,
    file: PathBuf,
    member: String,
    with_ip: bool,
    interval: Option<u64>,
    max_attempts: Option<u32>,
    report_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let scan_api = Arc::new(ScanApiClient::new(base_url));

    let bytes = tokio::fs::read(&file).await?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.apk")
        .to_string();

    let client_ip = if with_ip {
        let ips = lookup_client_ip(&reqwest::Client::new()).await;
        // The portal records each visit alongside the scan; best effort,
        // a failed record never blocks the upload.
        let access_logs = AccessLogClient::new(base_url);
        if let Err(e) = access_logs
            .record_access(&RecordAccessRequest {
                ipv4: ips.ipv4.clone(),
                ipv6: ips.ipv6.clone(),
            })
            .await
        {
            tracing::debug!(error = %e, "access record failed");
        }
        ips.ipv4
    } else {
        None
    };

    println!("uploading {} ({} bytes)...", file_name, bytes.len());
    let created = scan_api
        .create_scan_task(&member, &file_name, bytes, client_ip.as_deref())
        .await?;
    let task_id = created
        .task_id()
        .ok_or("backend did not return a task id")?
        .to_string();
    println!("task {task_id} created, polling for results");

    let mut options = config.poll_options();
    if let Some(secs) = interval {
        options.interval = Duration::from_secs(secs);
    }
    if let Some(n) = max_attempts {
        options.max_attempts = n;
    }

    let (tx, mut rx) =
        tokio::sync::mpsc::unbounded_channel::<Result<ScanStatusResponse, PollError>>();
    let tx_success = tx.clone();
    let tx_error = tx;

    let handle = start_scan_polling(
        Arc::clone(&scan_api),
        task_id.clone(),
        options,
        |response: &ScanStatusResponse| {
            if let Some(token) = response.status_token() {
                let token = token.to_ascii_lowercase();
                println!(
                    "  [{:>3}%] {}",
                    calculate_scan_progress(&token),
                    format_status_text(&token)
                );
            }
        },
        move |response| {
            let _ = tx_success.send(Ok(response));
        },
        move |err| {
            let _ = tx_error.send(Err(err));
        },
    );

    let outcome = tokio::select! {
        received = rx.recv() => received,
        _ = tokio::signal::ctrl_c() => {
            handle.cancel();
            println!("scan cancelled; task {task_id} keeps running on the backend");
            handle.join().await;
            return Ok(());
        }
    };

    match outcome {
        Some(Ok(response)) => {
            println!("scan completed");
            if let Some(result) = &response.result {
                print_scan_result(result);
            }
            if let Some(dir) = report_dir {
                let path = scan_api.download_report(&task_id, &dir).await?;
                println!("report saved to {}", path.display());
            }
            Ok(())
        }
        Some(Err(err)) => Err(err.into()),
        None => Err("polling session ended without a result".into()),
    }
}

async fn run_register(
    base_url: &str,
    email: String,
    full_name: String,
    company: String,
    phone: String,
    note: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ScanApiClient::new(base_url);

    let sent = client.send_otp(&email).await?;
    println!("{}", sent.message);

    print!("Enter the OTP code sent to {email}: ");
    std::io::stdout().flush()?;
    let mut otp = String::new();
    std::io::stdin().read_line(&mut otp)?;
    let otp = otp.trim().to_string();

    let ips = lookup_client_ip(&reqwest::Client::new()).await;
    let verified = client
        .verify_otp(&email, &otp, ips.ipv4.as_deref(), ips.ipv6.as_deref())
        .await?;
    if !verified.verified {
        return Err(verified
            .message
            .unwrap_or_else(|| "OTP verification failed".to_string())
            .into());
    }

    client
        .submit_user_info(&SubmitUserInfoRequest {
            email: email.clone(),
            otp: otp.clone(),
            full_name,
            company_name: company,
            phone,
            note,
            file_name: None,
            file_size: None,
        })
        .await?;

    let created = client
        .create_member_with_service(&CreateMemberWithServiceRequest {
            email: email.clone(),
            services: vec![ServiceSelection::APP_TOTAL_GO],
        })
        .await?;

    println!("member {} registered for AppTotalGo", created.member.email);
    Ok(())
}

fn print_status_line(response: &ScanStatusResponse) {
    match response.status_token() {
        Some(token) => {
            let normalized = token.to_ascii_lowercase();
            println!(
                "task {}: {} ({}%)",
                response.task_id().unwrap_or("?"),
                format_status_text(&normalized),
                calculate_scan_progress(&normalized)
            );
        }
        None => println!("no status in response"),
    }
    if let Some(result) = &response.result {
        print_scan_result(result);
    }
}

fn print_scan_result(result: &ScanResult) {
    if let Some(app) = &result.app_name {
        println!("  app:         {app}");
    }
    if let Some(package) = &result.package_name {
        println!("  package:     {package}");
    }
    if let Some(risk) = &result.risk_level {
        println!("  risk level:  {risk}");
    }
    if !result.detected_threats.is_empty() {
        println!("  threats:");
        for threat in &result.detected_threats {
            println!("    - {threat}");
        }
    }
}

/// `--csv` with no value exports to a date-stamped file in the current
/// directory.
fn default_csv_path(path: PathBuf, prefix: &str) -> PathBuf {
    if path.as_os_str().is_empty() {
        PathBuf::from(export::dated_file_name(prefix))
    } else {
        path
    }
}
