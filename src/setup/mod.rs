//! Interactive setup: registers the `voxline` MCP server with local
//! assistant hosts (Cursor, etc.). Grounded on the teacher's
//! `setup_cursor_config`/`run_setup` flow — same "read existing JSON,
//! preserve unrelated fields, upsert our entry" approach — with the
//! MIDI-specific SoundFont download step removed, since voxline has no
//! asset to fetch before it can run.

pub mod config;

use config::{HostConfig, SetupConfig};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

const CURSOR_CONFIG_PATH: &str = ".cursor/mcp.json";
const SERVER_NAME: &str = "voxline";

fn get_data_dir_info() -> String {
    if let Some(data_dir) = dirs::data_dir() {
        let voxline_dir = data_dir.join("voxline");
        format!(
            "Platform data directory: {:?}\n   (Linux: ~/.local/share, macOS: ~/Library/Application Support, Windows: %APPDATA%)",
            voxline_dir
        )
    } else {
        "Platform data directory: Current directory (.)".to_string()
    }
}

fn get_server_command() -> String {
    env::current_exe()
        .unwrap_or_else(|_| PathBuf::from("voxline"))
        .to_string_lossy()
        .to_string()
}

fn ask_permission(message: &str) -> bool {
    print!("{} (y/N): ", message);
    io::stdout().flush().unwrap();

    let mut input = String::new();
    io::stdin().read_line(&mut input).unwrap();

    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn run_setup() {
    println!("Setting up voxline...\n");

    println!("Step 1: MCP Host Configuration");
    println!("This will configure Cursor to use the voxline MCP server.");
    println!("Configuration file: ~/.cursor/mcp.json");
    println!();

    if ask_permission("Do you want to configure Cursor MCP integration?") {
        setup_cursor_config();
    } else {
        println!("Cursor configuration skipped.");
        println!("   You can run setup again later or manually configure:");
        println!("   Add this to ~/.cursor/mcp.json:");
        println!("   {{");
        println!("     \"mcpServers\": {{");
        println!("       \"{}\": {{", SERVER_NAME);
        println!("         \"transport\": \"stdio\",");
        println!("         \"command\": \"{}\",", get_server_command());
        println!("         \"enabled\": true");
        println!("       }}");
        println!("     }}");
        println!("   }}");
    }

    println!("\nSetup complete.");
    println!("   Next steps:");
    println!("   1. Restart Cursor if you configured it");
    println!("   2. Try asking it to render a line of dialogue as speech");
    println!("   3. For help: run with --help or check the documentation");
    println!();
    println!("   {}", get_data_dir_info());
    println!("   Host registry: {:?}", SetupConfig::config_path());
    println!("   Log files will be stored in the same directory");
}

fn setup_cursor_config() {
    let config_path = match dirs::home_dir() {
        Some(home) => home.join(CURSOR_CONFIG_PATH),
        None => {
            eprintln!("Could not determine home directory.");
            return;
        }
    };

    let mut config_value: serde_json::Value = if config_path.exists() {
        match fs::read_to_string(&config_path) {
            Ok(content) if !content.trim().is_empty() => {
                match serde_json::from_str(&content) {
                    Ok(value) => value,
                    Err(e) => {
                        eprintln!(
                            "Warning: Could not parse existing config ({}), creating backup and starting fresh",
                            e
                        );
                        let backup_path = config_path.with_extension("json.backup");
                        if let Err(backup_err) = fs::copy(&config_path, &backup_path) {
                            eprintln!("   Failed to create backup: {}", backup_err);
                        } else {
                            println!("   Backup saved to: {:?}", backup_path);
                        }
                        serde_json::json!({})
                    }
                }
            }
            _ => serde_json::json!({}),
        }
    } else {
        serde_json::json!({})
    };

    if !config_value.is_object() {
        config_value = serde_json::json!({});
    }

    let config_obj = config_value.as_object_mut().unwrap();
    if !config_obj.contains_key("mcpServers") {
        config_obj.insert("mcpServers".to_string(), serde_json::json!({}));
    }

    let mcp_servers = config_obj.get_mut("mcpServers").unwrap().as_object_mut();
    if mcp_servers.is_none() {
        eprintln!("Warning: mcpServers is not an object, replacing it");
        config_obj.insert("mcpServers".to_string(), serde_json::json!({}));
    }
    let mcp_servers = config_obj
        .get_mut("mcpServers")
        .unwrap()
        .as_object_mut()
        .unwrap();

    let voxline_entry = serde_json::json!({
        "transport": "stdio",
        "command": get_server_command(),
        "enabled": true
    });

    let mut updated = false;
    match mcp_servers.get(SERVER_NAME) {
        Some(existing) if existing == &voxline_entry => {
            println!("voxline entry already up to date in Cursor config.");
        }
        _ => {
            mcp_servers.insert(SERVER_NAME.to_string(), voxline_entry);
            updated = true;
            println!("Added or updated voxline entry in Cursor config.");
        }
    }

    if updated {
        if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match fs::File::create(&config_path).and_then(|mut f| {
            let content = serde_json::to_string_pretty(&config_value).unwrap();
            f.write_all(content.as_bytes())
        }) {
            Ok(_) => println!("Saved Cursor MCP config to {:?}", config_path),
            Err(e) => eprintln!("Failed to save Cursor MCP config: {}", e),
        }
    }

    let mut registry = SetupConfig::load().unwrap_or_default();
    registry.upsert_host(HostConfig {
        name: "cursor".to_string(),
        endpoint: config_path.to_string_lossy().to_string(),
        enabled: true,
    });
    registry
        .save()
        .unwrap_or_else(|e| eprintln!("Warning: could not save host registry: {}", e));
}
