//! `folio setup`: provision the backend and write the dashboard env file.

use anyhow::{Context, bail};
use dialoguer::{Input, Password};
use folio_appwrite::{ClientOptions, RestClient};
use folio_common::config::AppConfig;
use folio_store::schema;

use crate::cli::SetupArgs;

/// Settle a value from the flag, then the loaded config, then a prompt.
fn resolve(
    flag: Option<String>,
    configured: Option<&str>,
    prompt: &str,
    secret: bool,
    no_input: bool,
) -> anyhow::Result<String> {
    if let Some(v) = flag.filter(|v| !v.trim().is_empty()) {
        return Ok(v);
    }
    if let Some(v) = configured.filter(|v| !v.trim().is_empty()) {
        return Ok(v.to_string());
    }
    if no_input {
        bail!("{prompt} is required (pass it as a flag or set it in the environment)");
    }
    let value = if secret {
        Password::new().with_prompt(prompt).interact()?
    } else {
        Input::<String>::new().with_prompt(prompt).interact_text()?
    };
    Ok(value)
}

pub async fn run(args: SetupArgs, loaded: &AppConfig) -> anyhow::Result<()> {
    let mut config = loaded.clone();
    config.appwrite.endpoint = resolve(
        args.endpoint,
        Some(&loaded.appwrite.endpoint),
        "Appwrite endpoint",
        false,
        args.no_input,
    )?;
    config.appwrite.project = resolve(
        args.project,
        Some(&loaded.appwrite.project),
        "Project ID",
        false,
        args.no_input,
    )?;
    let api_key = resolve(
        args.api_key,
        loaded.appwrite.api_key.as_deref(),
        "API key",
        true,
        args.no_input,
    )?;
    config.appwrite.api_key = Some(api_key.clone());

    let client = RestClient::new(
        ClientOptions::new(&config.appwrite.endpoint, &config.appwrite.project).api_key(api_key),
    )?;

    tracing::info!(endpoint = %config.appwrite.endpoint, project = %config.appwrite.project, "provisioning");
    let report = schema::provision(&client, &config)
        .await
        .context("provisioning failed")?;
    println!(
        "Created {} resources, {} already existed.",
        report.created.len(),
        report.existing.len()
    );
    for label in &report.created {
        println!("  + {label}");
    }

    let contents = schema::env_file(&config, args.save_key);
    tokio::fs::write(&args.env_file, contents)
        .await
        .with_context(|| format!("cannot write {}", args.env_file.display()))?;
    println!("Wrote {}", args.env_file.display());
    Ok(())
}
