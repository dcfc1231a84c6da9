//! CLI for composing and sending referral emails
//!
//! Talks to a running `referral-mail` server.
//!
//! # Usage
//!
//! ```bash
//! # Manage templates
//! referral templates list
//! referral templates create --name "Referral ask" --subject "Referral for {role}" --body-file ask.html
//! referral templates edit <id> --subject "Referral for {role} at {company}"
//! referral templates delete <id>
//!
//! # Preview, then send
//! referral send --template "Referral ask" --to hr@acme.com \
//!     --set HRname=Dana --set role=Engineer --set company=Acme --preview
//! referral send --template "Referral ask" --to hr@acme.com \
//!     --set HRname=Dana --set role=Engineer --set company=Acme --attach resume.pdf
//! ```

use anyhow::{anyhow, bail, Context};
use clap::{Parser, Subcommand};
use referral_mail::client::{ApiClient, DEFAULT_SERVER_URL};
use referral_mail::mailer::Attachment;
use referral_mail::session::ReferralSession;
use referral_mail::templates::{PlaceholderSet, Template, TemplateComposer, TemplateStore};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "referral")]
#[command(about = "Compose and send referral emails", long_about = None)]
struct Cli {
    /// Base URL of the referral-mail server
    #[arg(short, long, default_value = DEFAULT_SERVER_URL)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage stored templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Fill a template and send it
    Send {
        /// Template id or name
        #[arg(short, long)]
        template: String,
        /// Recipient address
        #[arg(long)]
        to: String,
        /// Placeholder value as key=value, repeatable
        #[arg(long = "set", value_parser = parse_key_value)]
        values: Vec<(String, String)>,
        /// File to attach
        #[arg(short, long)]
        attach: Option<PathBuf>,
        /// Placeholder keys, comma separated (defaults to HRname,role,company)
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,
        /// Print the rendered message before sending
        #[arg(long)]
        preview: bool,
        /// Render only, never send
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
enum TemplateCommands {
    /// List all templates
    List,
    /// Show one template
    Show {
        /// Template id or name
        template: String,
    },
    /// Create a template
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        subject: String,
        /// HTML body
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        /// Read the HTML body from a file
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
    /// Replace fields of an existing template
    Edit {
        /// Template id or name
        template: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,
        #[arg(long)]
        body_file: Option<PathBuf>,
    },
    /// Delete a template
    Delete {
        /// Template id or name
        template: String,
    },
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", s))?;
    Ok((key.trim().to_string(), value.to_string()))
}

async fn read_body(body: Option<String>, body_file: Option<PathBuf>) -> anyhow::Result<Option<String>> {
    match (body, body_file) {
        (Some(body), _) => Ok(Some(body)),
        (None, Some(path)) => {
            let body = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(Some(body))
        }
        (None, None) => Ok(None),
    }
}

/// Match by id first, then by exact name
async fn find_template(client: &ApiClient, needle: &str) -> anyhow::Result<Template> {
    if let Some(template) = client.get(needle).await? {
        return Ok(template);
    }

    let mut matches: Vec<Template> = client
        .list()
        .await?
        .into_iter()
        .filter(|t| t.name == needle)
        .collect();

    match matches.len() {
        0 => Err(anyhow!("No template with id or name '{}'", needle)),
        1 => Ok(matches.remove(0)),
        n => bail!("{} templates are named '{}', use the id instead", n, needle),
    }
}

fn print_template(template: &Template) {
    println!("Id:      {}", template.id);
    println!("Name:    {}", template.name);
    println!("Subject: {}", template.subject);
    println!("Updated: {}", template.updated_at.format("%Y-%m-%d %H:%M:%S"));
    println!();
    println!("{}", template.body);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "referral_mail=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.server);

    match cli.command {
        Commands::Templates { command } => match command {
            TemplateCommands::List => {
                let templates = client.list().await?;

                if templates.is_empty() {
                    println!("No templates found.");
                } else {
                    println!("{:<38} {:<30} {:<40}", "Id", "Name", "Subject");
                    println!("{:-<108}", "");

                    for template in &templates {
                        println!("{:<38} {:<30} {:<40}", template.id, template.name, template.subject);
                    }

                    println!("\nTotal: {} template(s)", templates.len());
                }
            }
            TemplateCommands::Show { template } => {
                let template = find_template(&client, &template).await?;
                print_template(&template);
            }
            TemplateCommands::Create {
                name,
                subject,
                body,
                body_file,
            } => {
                let body = read_body(body, body_file)
                    .await?
                    .ok_or_else(|| anyhow!("Either --body or --body-file is required"))?;

                let mut composer = TemplateComposer::new();
                composer.set_name(name);
                composer.set_subject(subject);
                composer.set_body(body);

                let template = composer.save(&client).await?;
                println!("✓ Template '{}' created ({})", template.name, template.id);
            }
            TemplateCommands::Edit {
                template,
                name,
                subject,
                body,
                body_file,
            } => {
                let existing = find_template(&client, &template).await?;
                let mut composer = TemplateComposer::edit(&existing);

                if let Some(name) = name {
                    composer.set_name(name);
                }
                if let Some(subject) = subject {
                    composer.set_subject(subject);
                }
                if let Some(body) = read_body(body, body_file).await? {
                    composer.set_body(body);
                }

                let template = composer.save(&client).await?;
                println!("✓ Template '{}' updated", template.name);
            }
            TemplateCommands::Delete { template } => {
                let template = find_template(&client, &template).await?;
                client.delete(&template.id).await?;
                println!("✓ Template '{}' deleted", template.name);
            }
        },
        Commands::Send {
            template,
            to,
            values,
            attach,
            keys,
            preview,
            dry_run,
        } => {
            let placeholders = if keys.is_empty() {
                PlaceholderSet::referral_defaults()
            } else {
                PlaceholderSet::new(keys)?
            };

            let template = find_template(&client, &template).await?;

            let mut session = ReferralSession::new(placeholders);
            session.select_template(template)?;
            for (key, value) in &values {
                session.set_placeholder(key, value.as_str())?;
            }
            session.set_recipient(to)?;
            if let Some(path) = attach {
                let attachment = Attachment::from_path(&path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                session.attach(attachment)?;
            }

            if preview || dry_run {
                let rendered = session.preview()?;
                println!("Subject: {}", rendered.subject);
                println!();
                println!("{}", rendered.body);
                println!();
            }

            if dry_run {
                return Ok(());
            }

            session.send(&client).await?;
            println!("✓ Email sent successfully!");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("role=Staff Engineer").unwrap(),
            ("role".to_string(), "Staff Engineer".to_string())
        );
        assert_eq!(
            parse_key_value("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_key_value("role").is_err());
    }

    #[test]
    fn test_cli_parses_send() {
        let cli = Cli::try_parse_from([
            "referral",
            "send",
            "--template",
            "Referral ask",
            "--to",
            "hr@acme.test",
            "--set",
            "HRname=Dana",
            "--keys",
            "HRname,role",
            "--dry-run",
        ])
        .unwrap();

        match cli.command {
            Commands::Send {
                values, keys, dry_run, ..
            } => {
                assert_eq!(values, vec![("HRname".to_string(), "Dana".to_string())]);
                assert_eq!(keys, vec!["HRname", "role"]);
                assert!(dry_run);
            }
            _ => panic!("expected send"),
        }
    }
}
