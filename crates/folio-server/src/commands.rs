//! Admin subcommands. Each one loads what it needs through the contexts and
//! prints a plain-text result on stdout.

use anyhow::Context;
use dialoguer::Password;
use folio_common::config::AppConfig;
use folio_common::models::{Document, Message, NewJobApplication, NewProject, Project};
use folio_store::{Contexts, MessagePoller, MoveOutcome, PollGate};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::cli::{AuthCommand, CvCommand, JobCommand, MessageCommand, ProjectCommand};
use crate::uploads::{read_upload, read_uploads};

fn project_line(p: &Document<Project>) -> String {
    let star = if p.featured { "*" } else { " " };
    let tech = if p.technologies.is_empty() {
        String::new()
    } else {
        format!(" [{}]", p.technologies.join(", "))
    };
    format!("{star} {}  {}{tech}", p.id, p.name)
}

/// `--search` and `--featured` narrow the list together.
fn filter_projects(
    items: Vec<Document<Project>>,
    search: Option<&str>,
    featured: bool,
) -> Vec<Document<Project>> {
    items
        .into_iter()
        .filter(|p| !featured || p.featured)
        .filter(|p| search.is_none_or(|term| p.matches(term)))
        .collect()
}

fn message_line(m: &Document<Message>) -> String {
    let flag = if m.archived {
        'A'
    } else if m.read {
        ' '
    } else {
        'N'
    };
    format!(
        "{flag} {}  {}  {} <{}>  {}",
        m.id,
        m.created_at.format("%Y-%m-%d %H:%M"),
        m.name,
        m.email,
        m.subject.as_deref().unwrap_or("(no subject)")
    )
}

pub async fn projects(ctx: &Contexts, command: ProjectCommand) -> anyhow::Result<()> {
    let projects = &ctx.projects;
    match command {
        ProjectCommand::List { search, featured } => {
            let items = filter_projects(projects.fetch_all().await?, search.as_deref(), featured);
            for p in &items {
                println!("{}", project_line(p));
            }
            println!("{} project(s)", items.len());
        }
        ProjectCommand::Add {
            name,
            description,
            technologies,
            github_url,
            live_url,
            featured,
            cover,
            images,
        } => {
            let cover = match cover {
                Some(path) => Some(read_upload(&path).await?),
                None => None,
            };
            let gallery = read_uploads(&images).await?;
            let form = NewProject { name, description, technologies, github_url, live_url, featured };
            let doc = projects.create(form, cover, gallery).await?;
            println!("Created project {}", doc.id);
        }
        ProjectCommand::Delete { id } => {
            projects.delete(&id).await?;
            println!("Deleted project {id}");
        }
    }
    Ok(())
}

pub async fn messages(
    ctx: &Contexts,
    config: &AppConfig,
    command: MessageCommand,
) -> anyhow::Result<()> {
    let inbox = &ctx.messages;
    match command {
        MessageCommand::List { filter, search } => {
            inbox.fetch_all().await?;
            let items = match search {
                Some(term) => inbox.search(filter, &term).await,
                None => inbox.view(filter).await,
            };
            for m in &items {
                println!("{}", message_line(m));
            }
            let unread = inbox.unread_count().await;
            println!("{} message(s), {unread} unread", items.len());
        }
        MessageCommand::Read { id, unread } => {
            inbox.set_read(&id, !unread).await?;
            println!("Marked {id} as {}", if unread { "unread" } else { "read" });
        }
        MessageCommand::Archive { id, restore } => {
            inbox.set_archived(&id, !restore).await?;
            println!("{} {id}", if restore { "Restored" } else { "Archived" });
        }
        MessageCommand::Delete { id } => {
            inbox.delete(&id).await?;
            println!("Deleted message {id}");
        }
        MessageCommand::Watch => {
            let gate = PollGate::new(
                &config.poll.state_file,
                Duration::from_secs(config.poll.interval_secs),
            );
            let cancel = CancellationToken::new();
            let stop = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stop.cancel();
                }
            });
            println!(
                "Watching messages every {}s (state in {}). Ctrl-C to stop.",
                config.poll.interval_secs, config.poll.state_file
            );
            MessagePoller::new(inbox.clone(), gate).run(cancel).await;
        }
    }
    Ok(())
}

pub async fn jobs(ctx: &Contexts, command: JobCommand) -> anyhow::Result<()> {
    let jobs = &ctx.jobs;
    match command {
        JobCommand::Board => {
            jobs.fetch_all().await?;
            for column in jobs.board().await.columns {
                println!("== {} ({})", column.title(), column.len());
                for app in &column.items {
                    println!("   {}  {} - {}", app.id, app.company, app.position);
                }
            }
        }
        JobCommand::Stats => {
            jobs.fetch_all().await?;
            let stats = jobs.stats().await;
            for (status, count) in &stats.by_status {
                println!("{:<10} {count}", status.label());
            }
            println!("{:<10} {}", "Total", stats.total);
            println!("{:<10} {}", "Active", stats.active());
        }
        JobCommand::Add { company, position, status, url, cv } => {
            let form = NewJobApplication {
                company,
                position,
                status,
                job_url: url,
                fk_cv_id: cv,
                ..Default::default()
            };
            let doc = jobs.create(form).await?;
            println!("Added application {}", doc.id);
        }
        JobCommand::Move { id, status } => match jobs.move_to(&id, status).await? {
            MoveOutcome::Moved(doc) => println!("Moved {} to {}", doc.id, doc.status.label()),
            MoveOutcome::Unchanged => println!("{id} is already in {}", status.label()),
            MoveOutcome::Busy => println!("Another move is in progress, try again"),
        },
        JobCommand::Delete { id } => {
            jobs.delete(&id).await?;
            println!("Deleted application {id}");
        }
    }
    Ok(())
}

pub async fn cvs(ctx: &Contexts, command: CvCommand) -> anyhow::Result<()> {
    let cvs = &ctx.cvs;
    match command {
        CvCommand::List => {
            cvs.fetch_all().await?;
            let jobs = ctx.jobs.fetch_all().await?;
            for cv in cvs.items().await {
                let used = jobs.iter().filter(|j| j.fk_cv_id.as_deref() == Some(cv.id.as_str())).count();
                let marker = if cv.is_default { "*" } else { " " };
                println!("{marker} {}  {}  ({}, used by {used})", cv.id, cv.name, cv.file_name);
            }
        }
        CvCommand::Upload { name, path } => {
            let file = read_upload(&path).await?;
            let doc = cvs.upload(&name, file).await?;
            println!("Uploaded CV {}", doc.id);
        }
        CvCommand::Default { id } => {
            cvs.set_default(&id).await?;
            println!("{id} is now the default CV");
        }
        CvCommand::Delete { id } => {
            cvs.delete(&id).await?;
            println!("Deleted CV {id}");
        }
    }
    Ok(())
}

pub async fn auth(ctx: &Contexts, command: AuthCommand) -> anyhow::Result<()> {
    match command {
        AuthCommand::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => Password::new().with_prompt("Password").interact()?,
            };
            let user = ctx.auth.login(&email, &password).await.context("login failed")?;
            println!("Signed in as {} <{}>", user.name, user.email);
            ctx.auth.logout().await?;
        }
    }
    Ok(())
}
