//! ruta CLI: driving adapter for the ruta router.
//!
//! Subcommands:
//! - `match <config> <url> [--method M] [--trace]`: match a URL, print the result as JSON
//! - `build <config> <name> [--arg V]... [--kwarg K=V]...`: build a URL by route name
//! - `check <config>`: validate that the config loads
//! - `routes <config>`: list compiled rules

use std::process;

use clap::{Parser, Subcommand};
use ruta::{BuildArgs, Request, Router, RouterConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ruta", version, about = "Match and build URLs against a route config")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match a URL or path against the config.
    Match {
        /// Route config (.json, else YAML).
        config: String,
        /// Absolute URL or path.
        url: String,
        /// Request method.
        #[arg(short, long, default_value = "GET")]
        method: String,
        /// Print every route tried.
        #[arg(long)]
        trace: bool,
    },
    /// Build a URL for a named route.
    Build {
        /// Route config (.json, else YAML).
        config: String,
        /// Effective route name.
        name: String,
        /// Positional value (repeatable).
        #[arg(long = "arg")]
        args: Vec<String>,
        /// Named value as key=value (repeatable).
        #[arg(long = "kwarg", value_parser = parse_pair)]
        kwargs: Vec<(String, String)>,
        /// host[:port] for an absolute URL.
        #[arg(long)]
        netloc: Option<String>,
        /// Scheme for an absolute URL.
        #[arg(long)]
        scheme: Option<String>,
        /// Fragment to append.
        #[arg(long)]
        fragment: Option<String>,
        /// Absolute URL built against this request URL.
        #[arg(long)]
        request: Option<String>,
    },
    /// Validate a config.
    Check {
        /// Route config (.json, else YAML).
        config: String,
    },
    /// List compiled rules.
    Routes {
        /// Route config (.json, else YAML).
        config: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Match {
            config,
            url,
            method,
            trace,
        } => cmd_match(&config, &url, &method, trace),
        Command::Build {
            config,
            name,
            args,
            kwargs,
            netloc,
            scheme,
            fragment,
            request,
        } => {
            let build_args = BuildArgs {
                args,
                kwargs: kwargs.into_iter().collect(),
                netloc,
                scheme,
                fragment,
                full: request.is_some(),
            };
            cmd_build(&config, &name, request.as_deref(), &build_args)
        }
        Command::Check { config } => cmd_check(&config),
        Command::Routes { config } => cmd_routes(&config),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ═══════════════════════════════════════════════════════════════════════════════
// Commands
// ═══════════════════════════════════════════════════════════════════════════════

fn cmd_match(config_path: &str, url: &str, method: &str, trace: bool) -> Result<(), String> {
    let router = load_router(config_path)?;
    let request = Request::blank(url)
        .map_err(|e| e.to_string())?
        .with_method(method);

    let result = if trace {
        let trace = router.match_with_trace(&request);
        for (depth, step) in trace.walk() {
            eprintln!(
                "{:indent$}[{}] {:?} {} {}",
                "",
                step.index,
                step.kind,
                step.template,
                if step.matched { "✓" } else { "✗" },
                indent = depth * 2
            );
        }
        trace.result
    } else {
        router.match_request(&request)
    };

    match result {
        Some(m) => {
            let json = serde_json::to_string_pretty(&m).map_err(|e| e.to_string())?;
            println!("{json}");
        }
        None => {
            let allowed = router.allowed_methods(&request);
            if allowed.is_empty() {
                println!("(no match)");
            } else {
                println!("(method not allowed; allowed: {})", allowed.join(", "));
            }
        }
    }

    Ok(())
}

fn cmd_build(
    config_path: &str,
    name: &str,
    request_url: Option<&str>,
    args: &BuildArgs,
) -> Result<(), String> {
    let router = load_router(config_path)?;
    let request = request_url
        .map(Request::blank)
        .transpose()
        .map_err(|e| e.to_string())?;

    let url = router
        .build(name, request.as_ref(), args)
        .map_err(|e| e.to_string())?;
    println!("{url}");
    Ok(())
}

fn cmd_check(config_path: &str) -> Result<(), String> {
    let router = load_router(config_path)?;
    println!(
        "Config valid: {} routes, {} rules",
        router.len(),
        router.rules().count()
    );
    Ok(())
}

fn cmd_routes(config_path: &str) -> Result<(), String> {
    let router = load_router(config_path)?;
    for rule in router.rules() {
        let methods = if rule.methods().is_empty() {
            "*".to_owned()
        } else {
            rule.methods().join(",")
        };
        let host = rule.host_template().unwrap_or("");
        println!(
            "{:<24} {:<8} {}{}  -> {}",
            rule.name().unwrap_or("-"),
            methods,
            host,
            rule.template(),
            rule.handler()
        );
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// Config loading
// ═══════════════════════════════════════════════════════════════════════════════

fn load_router(path: &str) -> Result<Router, String> {
    let config = load_config(path)?;
    let router = Router::from_config(config).map_err(|e| {
        tracing::warn!(path, error = %e, "route config rejected");
        format!("config invalid: {e}")
    })?;
    tracing::info!(path, rules = router.len(), "router loaded");
    Ok(router)
}

fn load_config(path: &str) -> Result<RouterConfig, String> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read \"{path}\": {e}"))?;
    parse_config(path, &content)
}

fn parse_config(path: &str, content: &str) -> Result<RouterConfig, String> {
    let is_json = std::path::Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    tracing::debug!(path, format = if is_json { "json" } else { "yaml" }, "parsing config");
    if is_json {
        serde_json::from_str(content).map_err(|e| format!("JSON parse error: {e}"))
    } else {
        // Default to YAML (handles .yaml and .yml)
        serde_yaml::from_str(content).map_err(|e| format!("YAML parse error: {e}"))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Argument parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_pair(pair: &str) -> Result<(String, String), String> {
    let (key, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("invalid pair \"{pair}\", expected key=value"))?;
    Ok((key.to_owned(), value.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_pair_ok() {
        assert_eq!(
            parse_pair("username=calvin").unwrap(),
            ("username".to_string(), "calvin".to_string())
        );
        assert_eq!(parse_pair("q=a=b").unwrap().1, "a=b");
    }

    #[test]
    fn parse_pair_missing_equals() {
        assert!(parse_pair("username").is_err());
    }

    #[test]
    fn build_args_from_command_line() {
        let cli = Cli::try_parse_from([
            "ruta",
            "build",
            "routes.yaml",
            "post",
            "--arg",
            "7",
            "--kwarg",
            "slug=intro",
            "--netloc",
            "example.com",
        ])
        .unwrap();
        match cli.command {
            Command::Build {
                name,
                args,
                kwargs,
                netloc,
                ..
            } => {
                assert_eq!(name, "post");
                assert_eq!(args, vec!["7".to_string()]);
                assert_eq!(kwargs, vec![("slug".to_string(), "intro".to_string())]);
                assert_eq!(netloc.as_deref(), Some("example.com"));
            }
            other => panic!("expected build, got {other:?}"),
        }
    }

    #[test]
    fn parse_yaml_and_json_configs() {
        let yaml = "routes:\n  - { type: rule, template: /, handler: Home, name: home }\n";
        let config = parse_config("routes.yaml", yaml).unwrap();
        assert_eq!(config.routes.len(), 1);

        let json = r#"{"routes": [{"type": "rule", "template": "/", "handler": "Home"}]}"#;
        let config = parse_config("routes.JSON", json).unwrap();
        assert_eq!(Router::from_config(config).unwrap().len(), 1);

        assert!(parse_config("routes.json", yaml).is_err());
    }
}
