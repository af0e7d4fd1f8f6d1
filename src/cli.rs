// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::{ConfigManager, CredentialStore, HttpApiClient, Session, SyncCoordinator};
use crate::database::SqliteCredentialStore;
use crate::types::{ApplicationStatus, CompanyId, JobId, ProfileUpdate, Registration, UserRole};
use crate::utils::format_salary;

#[derive(Parser)]
#[command(name = "jobportal")]
#[command(about = "Job portal client: saved jobs, applications and resumes")]
pub struct PortalCli {
    #[command(subcommand)]
    pub command: PortalCommand,

    /// Override the API base URL from configuration
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override the credential database path
    #[arg(long)]
    pub credentials_db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum PortalCommand {
    /// Create an account
    Register {
        username: String,
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long, default_value = "")]
        email: String,
    },
    /// Log in with username and password
    Login { username: String, password: String },
    /// Forget the stored credential
    Logout,
    /// Show the current session
    Whoami,
    /// Edit my name, contact details or role
    UpdateProfile {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// candidate or employer
        #[arg(long)]
        role: Option<String>,
    },
    ChangePassword {
        old_password: String,
        new_password: String,
    },
    /// Browse public job postings
    Jobs {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        query: Option<String>,
    },
    /// Show one job posting
    Job { job_id: JobId },
    /// List companies
    Companies,
    /// List the jobs of one company
    CompanyJobs { company_id: CompanyId },
    /// List saved jobs
    Saved,
    /// Toggle the saved flag of a job
    Save { job_id: JobId },
    /// List my applications
    Applications,
    /// Apply to a job with one of my resumes
    Apply { job_id: JobId, resume_id: i64 },
    /// Withdraw one of my applications
    Withdraw { application_id: i64 },
    /// Set the status of an application (employer)
    SetStatus {
        application_id: i64,
        status: ApplicationStatus,
    },
    /// Mark a pending application as reviewed (employer)
    Review { application_id: i64 },
    /// List my resumes
    Resumes,
    /// Upload a pdf or docx resume
    UploadResume {
        file: PathBuf,
        #[arg(long)]
        title: String,
        #[arg(long)]
        default: bool,
    },
    RenameResume { resume_id: i64, title: String },
    /// Make a resume my default one
    DefaultResume { resume_id: i64 },
    DeleteResume { resume_id: i64 },
    /// Jobs recommended for me, with their fit analysis
    Recommendations,
}

fn parse_role(role: &str) -> Result<UserRole> {
    match role.to_lowercase().as_str() {
        "candidate" => Ok(UserRole::Candidate),
        "employer" => Ok(UserRole::Employer),
        other => anyhow::bail!("Unknown role: {} (expected candidate or employer)", other),
    }
}

fn require_session(session: Option<Session>) -> Result<Session> {
    session.ok_or_else(|| anyhow::anyhow!("Not logged in. Run `jobportal login` first."))
}

pub async fn handle_portal_command(cli: PortalCli, mut config: ConfigManager) -> Result<()> {
    if let Some(url) = cli.api_url {
        config.service.api_url = url;
    }
    if let Some(path) = cli.credentials_db {
        config.environment.credentials_db_path = path;
    }

    let api = Arc::new(HttpApiClient::from_config(&config.service)?);
    let credentials: Arc<dyn CredentialStore> = Arc::new(
        SqliteCredentialStore::open(config.environment.credentials_db_path.clone())
            .await
            .context("Failed to open credential store")?,
    );
    let coordinator = SyncCoordinator::new(api.clone(), api.clone(), credentials);

    if !matches!(
        cli.command,
        PortalCommand::Login { .. } | PortalCommand::Register { .. }
    ) {
        if let Err(e) = coordinator.restore_session().await {
            error!("Failed to restore session: {}", e);
            println!("⚠️  Could not restore session: {}", e);
        }
    }

    match cli.command {
        PortalCommand::Register {
            username,
            password,
            first_name,
            last_name,
            email,
        } => {
            let registration = Registration {
                username,
                password,
                first_name,
                last_name,
                email,
            };
            let user = api.register(&registration).await?;
            info!("Registered {}", user.username);
            println!("✅ Account {} created. Run `jobportal login` to sign in.", user.username);
        }

        PortalCommand::Login { username, password } => {
            match coordinator.authenticate(&username, &password).await {
                Ok(session) => {
                    info!("Logged in as {}", session.identity());
                    println!("✅ Logged in as {} ({})", session.user.display_name(), session.role());
                }
                Err(e) => {
                    // The session may still be live when only a snapshot fetch failed.
                    match coordinator.session().await {
                        Some(session) => println!(
                            "⚠️  Logged in as {} but some data failed to load: {}",
                            session.identity(),
                            e
                        ),
                        None => anyhow::bail!("Login failed: {}", e),
                    }
                }
            }
        }

        PortalCommand::Logout => {
            coordinator.logout().await?;
            println!("✅ Logged out");
        }

        PortalCommand::Whoami => match coordinator.session().await {
            Some(session) => {
                println!("👤 {} ({})", session.user.display_name(), session.role());
                println!("   Username: {}", session.identity());
                if let Some(email) = &session.user.email {
                    println!("   Email: {}", email);
                }
                println!("   Saved jobs: {}", coordinator.saved_jobs().await.len());
                if session.role().tracks_applications() {
                    println!("   Applications: {}", coordinator.applications().await.len());
                }
            }
            None => println!("Anonymous"),
        },

        PortalCommand::UpdateProfile {
            first_name,
            last_name,
            phone,
            address,
            role,
        } => {
            require_session(coordinator.session().await)?;
            let update = ProfileUpdate {
                first_name,
                last_name,
                phone_number: phone,
                address,
                user_type: role.as_deref().map(parse_role).transpose()?,
            };
            if update.is_empty() {
                println!("Nothing to update.");
                return Ok(());
            }
            let generation = coordinator.generation().await;
            match coordinator.update_profile(&update).await {
                Ok(session) => println!(
                    "✅ Profile updated: {} ({})",
                    session.user.display_name(),
                    session.role()
                ),
                Err(e) => {
                    // A new generation means the profile was saved and only a snapshot failed.
                    let relogged = coordinator.generation().await != generation
                        && coordinator.session().await.is_some();
                    if !relogged {
                        return Err(e.into());
                    }
                    println!("⚠️  Profile updated but some data failed to load: {}", e);
                }
            }
        }

        PortalCommand::ChangePassword {
            old_password,
            new_password,
        } => {
            let session = require_session(coordinator.session().await)?;
            api.change_password(&session, &old_password, &new_password)
                .await?;
            println!("✅ Password changed");
        }

        PortalCommand::Jobs { page, query } => {
            let listing = api.list_jobs(page, query.as_deref()).await?;
            println!("📋 {} jobs (page {})", listing.count, page);
            for job in &listing.results {
                let marker = if coordinator.is_job_saved(job.id).await { "★" } else { " " };
                println!(
                    " {} [{}] {} - {}",
                    marker,
                    job.id,
                    job.title,
                    format_salary(job.salary)
                );
            }
            if listing.has_next() {
                println!("   More: --page {}", page + 1);
            }
        }

        PortalCommand::Job { job_id } => {
            let session = coordinator.session().await;
            let detail = api
                .job_detail(session.as_ref().map(|s| &s.credential), job_id)
                .await?;
            println!("💼 [{}] {}", detail.job.id, detail.job.title);
            if let Some(company) = &detail.company {
                println!("   Company: {}", company.name);
            }
            if let Some(location) = &detail.location {
                println!("   Location: {}", location);
            }
            println!("   Salary: {}", format_salary(detail.job.salary));
            if let Some(saved) = detail.is_saved {
                println!("   Saved: {}", if saved { "yes" } else { "no" });
            }
        }

        PortalCommand::Companies => {
            let companies = api.list_companies().await?;
            if companies.is_empty() {
                println!("No companies.");
            }
            for company in companies {
                println!("🏢 [{}] {}", company.id, company.name);
            }
        }

        PortalCommand::CompanyJobs { company_id } => {
            let jobs = api.company_jobs(company_id).await?;
            println!("📋 {} jobs at company {}", jobs.len(), company_id);
            for job in jobs {
                println!(" [{}] {} - {}", job.id, job.title, format_salary(job.salary));
            }
        }

        PortalCommand::Saved => {
            require_session(coordinator.session().await)?;
            let saved = coordinator.saved_jobs().await;
            if saved.is_empty() {
                println!("No saved jobs.");
            }
            for entry in saved {
                println!(
                    "★ [{}] {} - {}",
                    entry.job.id,
                    entry.job.title,
                    format_salary(entry.job.salary)
                );
            }
        }

        PortalCommand::Save { job_id } => {
            require_session(coordinator.session().await)?;
            let saved = coordinator.toggle_save_job(job_id).await?;
            if saved {
                println!("★ Job {} saved", job_id);
            } else {
                println!("☆ Job {} removed from saved jobs", job_id);
            }
        }

        PortalCommand::Applications => {
            require_session(coordinator.session().await)?;
            let applications = coordinator.applications().await;
            if applications.is_empty() {
                println!("You have not applied to any job yet.");
            }
            for app in applications {
                let job = app.job.map(|j| j.to_string()).unwrap_or_else(|| "?".to_string());
                let hint = if app.status.is_withdrawable() { " (withdrawable)" } else { "" };
                println!("📄 #{} job {} - {}{}", app.id, job, app.status, hint);
            }
        }

        PortalCommand::Apply { job_id, resume_id } => {
            require_session(coordinator.session().await)?;
            let app = coordinator.apply_to_job(job_id, resume_id).await?;
            println!("✅ Applied to job {} (application #{})", job_id, app.id);
        }

        PortalCommand::Withdraw { application_id } => {
            require_session(coordinator.session().await)?;
            let app = coordinator.withdraw_application(application_id).await?;
            println!("✅ Application #{} is now {}", app.id, app.status);
        }

        PortalCommand::SetStatus {
            application_id,
            status,
        } => {
            require_session(coordinator.session().await)?;
            let app = coordinator
                .update_application_status(application_id, status)
                .await?;
            println!("✅ Application #{} is now {}", app.id, app.status);
        }

        PortalCommand::Review { application_id } => {
            require_session(coordinator.session().await)?;
            let app = coordinator.review_application(application_id).await?;
            println!("✅ Application #{} is now {}", app.id, app.status);
        }

        PortalCommand::Resumes => {
            let session = require_session(coordinator.session().await)?;
            let resumes = api.list_resumes(&session).await?;
            if resumes.is_empty() {
                println!("No resumes uploaded.");
            }
            for resume in resumes {
                let default = if resume.is_default { " (default)" } else { "" };
                println!("📎 [{}] {}{}", resume.id, resume.title, default);
            }
        }

        PortalCommand::UploadResume {
            file,
            title,
            default,
        } => {
            let session = require_session(coordinator.session().await)?;
            let resume = api.upload_resume(&session, &file, &title, default).await?;
            println!("✅ Uploaded resume [{}] {}", resume.id, resume.title);
        }

        PortalCommand::RenameResume { resume_id, title } => {
            let session = require_session(coordinator.session().await)?;
            let resume = api.rename_resume(&session, resume_id, &title).await?;
            println!("✅ Resume [{}] renamed to {}", resume.id, resume.title);
        }

        PortalCommand::DefaultResume { resume_id } => {
            let session = require_session(coordinator.session().await)?;
            let resume = api.set_default_resume(&session, resume_id).await?;
            println!("✅ Resume [{}] {} is now the default", resume.id, resume.title);
        }

        PortalCommand::DeleteResume { resume_id } => {
            let session = require_session(coordinator.session().await)?;
            api.delete_resume(&session, resume_id).await?;
            println!("🗑️  Resume [{}] deleted", resume_id);
        }

        PortalCommand::Recommendations => {
            require_session(coordinator.session().await)?;
            let recommendations = coordinator.load_recommendations().await?;
            if recommendations.is_empty() {
                println!("No recommendations yet.");
            }
            for item in recommendations {
                let job = &item.job.job;
                println!(
                    "🎯 [{}] {} - {} ({})",
                    job.id,
                    job.title,
                    format_salary(job.salary),
                    item.job.location.as_deref().unwrap_or("anywhere")
                );
                let Some(report) = &item.analysis else {
                    println!("   No fit analysis");
                    continue;
                };
                if let Some(score) = report.score {
                    println!("   Fit score: {}", score);
                }
                if !report.matched_skills.is_empty() {
                    println!("   Matching: {}", report.matched_skills.join(", "));
                }
                if !report.missing_skills.is_empty() {
                    println!("   Missing: {}", report.missing_skills.join(", "));
                }
                if let Some(summary) = &report.summary {
                    println!("   {}", summary);
                }
            }
        }
    }

    Ok(())
}
