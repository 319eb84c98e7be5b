use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use colored::*;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "8080";
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

const PHASE_NAMES: [&str; 4] = ["IDLE", "INIT", "TIME-LAPSE", "REALTIME"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = App::new("scsimctl")
        .version("0.1.0")
        .about("🛰️  Spacecraft simulator command client")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("host")
                .short("h")
                .long("host")
                .value_name("HOST")
                .help("Simulator host address")
                .takes_value(true)
                .default_value(DEFAULT_HOST)
                .global(true),
        )
        .arg(
            Arg::with_name("port")
                .short("p")
                .long("port")
                .value_name("PORT")
                .help("Simulator port")
                .takes_value(true)
                .default_value(DEFAULT_PORT)
                .global(true),
        )
        .arg(
            Arg::with_name("format")
                .short("f")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .takes_value(true)
                .possible_values(&["json", "table"])
                .default_value("table")
                .global(true),
        )
        .subcommand(
            SubCommand::with_name("start")
                .about("▶️  Start a simulation run")
                .arg(
                    Arg::with_name("scenario")
                        .help("Scenario identifier")
                        .required(true)
                        .validator(|v| match v.parse::<u16>() {
                            Ok(_) => Ok(()),
                            Err(_) => Err("Scenario must be a number".into()),
                        }),
                ),
        )
        .subcommand(SubCommand::with_name("stop").about("⏹️  Stop the running simulation"))
        .subcommand(
            SubCommand::with_name("playback")
                .about("📼 Recorder playback control")
                .arg(
                    Arg::with_name("state")
                        .help("Playback state")
                        .required(true)
                        .possible_values(&["start", "stop"]),
                ),
        )
        .subcommand(
            SubCommand::with_name("json")
                .about("🧾 Send a single-field JSON command id")
                .arg(
                    Arg::with_name("id")
                        .help("Command id (1-5)")
                        .required(true)
                        .validator(|v| match v.parse::<u8>() {
                            Ok(_) => Ok(()),
                            Err(_) => Err("Command id must be 0-255".into()),
                        }),
                ),
        )
        .subcommand(SubCommand::with_name("monitor").about("📈 Monitor live telemetry stream"))
        .get_matches();

    let host = matches.value_of("host").unwrap_or(DEFAULT_HOST).to_owned();
    let port: u16 = matches.value_of("port").unwrap_or(DEFAULT_PORT).parse()?;
    let format = matches.value_of("format").unwrap_or("table").to_owned();

    match matches.subcommand() {
        ("start", Some(sub)) => {
            let scenario: u16 = arg_value(sub, "scenario")?.parse()?;
            let command = serde_json::json!({ "command": "start_sim", "scenario": scenario });
            run_command(&host, port, &format, command).await
        }
        ("stop", Some(_)) => {
            run_command(&host, port, &format, serde_json::json!({ "command": "stop_sim" })).await
        }
        ("playback", Some(sub)) => {
            let command = match arg_value(sub, "state")? {
                "start" => serde_json::json!({ "command": "start_playback" }),
                _ => serde_json::json!({ "command": "stop_playback" }),
            };
            run_command(&host, port, &format, command).await
        }
        ("json", Some(sub)) => {
            let id: u8 = arg_value(sub, "id")?.parse()?;
            run_command(&host, port, &format, serde_json::json!({ "id": id })).await
        }
        ("monitor", Some(_)) => monitor(&host, port, &format).await,
        _ => Ok(()),
    }
}

fn arg_value<'a>(matches: &'a ArgMatches<'_>, name: &str) -> Result<&'a str, Box<dyn std::error::Error>> {
    matches
        .value_of(name)
        .ok_or_else(|| format!("Missing argument {name}").into())
}

async fn run_command(
    host: &str,
    port: u16,
    format: &str,
    command: serde_json::Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let response = send_command(host, port, command.to_string()).await?;
    print_command_result(&response, format);
    Ok(())
}

/// Connect, send one command line and wait for its response. Telemetry lines
/// that arrive first are skipped.
async fn send_command(host: &str, port: u16, command: String) -> Result<String, Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", host, port);
    let stream = match TcpStream::connect(&addr).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("{} Failed to connect to simulator at {}", "❌".red(), addr.bright_white());
            if e.kind() == std::io::ErrorKind::ConnectionRefused {
                eprintln!("{} Server is not running. Start it with:", "💡".yellow());
                eprintln!("   {}", "cargo run --bin scsim".bright_cyan());
            }
            return Err(e.into());
        }
    };

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    match tokio::time::timeout(COMMAND_TIMEOUT, async {
        writer.write_all(command.as_bytes()).await?;
        writer.write_all(b"\n").await?;

        while let Some(line) = lines.next_line().await? {
            let is_response = serde_json::from_str::<serde_json::Value>(&line)
                .map(|value| value.get("status").is_some())
                .unwrap_or(false);
            if is_response {
                return Ok(line);
            }
        }
        Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "Server closed connection",
        ))
    })
    .await
    {
        Ok(result) => Ok(result?),
        Err(_) => {
            eprintln!("{} Command timed out after 5 seconds", "⏰".yellow());
            Err("Command timeout".into())
        }
    }
}

fn print_command_result(response: &str, format: &str) {
    if format == "json" {
        println!("{}", response);
        return;
    }

    let Ok(value) = serde_json::from_str::<serde_json::Value>(response) else {
        println!("{} Unparseable response: {}", "❌".red(), response);
        return;
    };
    let message = value["message"].as_str().unwrap_or("");
    match value["status"].as_str().unwrap_or("") {
        "Acknowledged" => println!("{} {}", "✅".green(), message.bright_green()),
        "NegativeAck" => println!("{} Rejected: {}", "❌".red(), message.bright_red()),
        _ => println!("{} Invalid: {}", "⚠️".yellow(), message.yellow()),
    }
}

async fn monitor(host: &str, port: u16, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let stream = TcpStream::connect((host, port)).await?;
    let mut lines = BufReader::new(stream).lines();

    if format != "json" {
        println!("{}", "│   Time │ Phase      │ Contact │ Remain │ Last Event │ Next Event │".bright_white());
    }

    while let Some(line) = lines.next_line().await? {
        if format == "json" {
            println!("{}", line);
            continue;
        }

        let Ok(tlm) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        match tlm["type"].as_str() {
            Some("mgmt_tlm") => print_mgmt_row(&tlm),
            Some("model_tlm") => print_model_row(&tlm),
            _ => {}
        }
    }

    Ok(())
}

fn print_mgmt_row(tlm: &serde_json::Value) {
    let time = tlm["sim_time"].as_u64().unwrap_or(0);
    let phase = tlm["sim_phase"].as_u64().unwrap_or(0) as usize;
    let pending = tlm["contact_time_pending"].as_i64().unwrap_or(-1);
    let remaining = tlm["contact_time_remaining"].as_u64().unwrap_or(0);

    let phase_str = format!("{:<10}", PHASE_NAMES.get(phase).copied().unwrap_or("?"));
    let phase_str = if tlm["sim_active"].as_bool().unwrap_or(false) {
        phase_str.bright_green()
    } else {
        phase_str.white()
    };
    let contact_str = match pending {
        0 => "     AOS".bright_green(),
        p if p > 0 => format!("{:>8}", format!("T-{p}")).yellow(),
        _ => "      --".white(),
    };

    println!(
        "│ {:>6} │ {} │ {} │ {:>6} │ {:>5}/{:<4} │ {:>5}/{:<4} │",
        time,
        phase_str,
        contact_str,
        remaining,
        tlm["last_event_subsys"].as_u64().unwrap_or(0),
        tlm["last_event_id"].as_u64().unwrap_or(0),
        tlm["next_event_subsys"].as_u64().unwrap_or(0),
        tlm["next_event_id"].as_u64().unwrap_or(0),
    );
}

fn print_model_row(tlm: &serde_json::Value) {
    let soc = tlm["power_batt_soc"].as_f64().unwrap_or(0.0);
    let soc_str = if soc > 50.0 {
        format!("{soc:.2}%").green()
    } else {
        format!("{soc:.2}%").yellow()
    };
    let eclipse_str = if tlm["adcs_eclipse"].as_bool().unwrap_or(false) {
        "ECLIPSE".bright_blue()
    } else {
        "SUNLIT".bright_yellow()
    };

    println!(
        "│        └ {} SOC {} REC {:.2}% FILES {} PLBK {} │",
        eclipse_str,
        soc_str,
        tlm["fsw_rec_pct_used"].as_f64().unwrap_or(0.0),
        tlm["fsw_rec_file_cnt"].as_u64().unwrap_or(0),
        tlm["fsw_rec_playback_ena"].as_bool().unwrap_or(false),
    );
}
