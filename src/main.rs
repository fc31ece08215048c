use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mim::areas::repository::Repository;
use mim::artifacts::objects::hasher::HashAlgorithm;
use mim::commands::porcelain::log::LogOptions;
use mim::commands::porcelain::remote::DEFAULT_REMOTE;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "MIM_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Parser)]
#[command(
    name = "mim",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A small content-addressed version control system",
    long_about = "mim tracks snapshots of a working tree as commits over a content-addressed \
    object store, with branches, a staging area, line diffs and patches, and \
    fast-forward synchronization with other repositories on disk.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
        #[arg(long, default_value = "sha256", value_parser = parse_hash, help = "Object hash function (sha256 or sha1)")]
        hash: HashAlgorithm,
    },
    #[command(name = "add", about = "Stage files for the next commit")]
    Add {
        #[arg(required = true, help = "Files or directories to stage")]
        paths: Vec<PathBuf>,
    },
    #[command(name = "restore", about = "Unstage files")]
    Restore {
        #[arg(long, help = "Remove the files from the staging area")]
        staged: bool,
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "rm",
        about = "Remove files from the working tree and stage the removal"
    )]
    Rm {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command creates a new commit in the repository with the specified commit message."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "status", about = "Show the working tree status")]
    Status {
        #[arg(long, help = "Two-column machine-readable output")]
        porcelain: bool,
    },
    #[command(name = "log", about = "Show the commit history of HEAD")]
    Log {
        #[arg(short = 'n', long = "max-count", default_value_t = 0, help = "Limit the number of commits")]
        max_count: usize,
        #[arg(long, help = "One line per commit")]
        oneline: bool,
    },
    #[command(
        name = "branch",
        about = "List, create, or delete branches",
        long_about = "Without arguments, lists all branches. With a name, creates a branch at the \
        start point (HEAD by default). With -d, deletes the named branch."
    )]
    Branch {
        name: Option<String>,
        #[arg(help = "Revision the new branch starts at")]
        start_point: Option<String>,
        #[arg(short, long, requires = "name", help = "Delete the branch")]
        delete: bool,
    },
    #[command(name = "checkout", about = "Switch branches or detach HEAD at a commit")]
    Checkout {
        #[arg(help = "Branch name or revision")]
        target: String,
    },
    #[command(name = "diff", about = "Show the line diff between two files")]
    Diff { old: PathBuf, new: PathBuf },
    #[command(name = "apply", about = "Apply a patch to the working tree")]
    Apply { patch: PathBuf },
    #[command(
        name = "cat-file",
        about = "Print the content of an object",
        long_about = "This command prints the content of an object in the repository. \
        It requires the ID (or an unambiguous prefix) of the object to be specified."
    )]
    CatFile {
        #[arg(short = 'p', long, help = "The object ID to print")]
        sha: String,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file and optionally write it to the object store"
    )]
    HashObject {
        #[arg(short, long, required = false, help = "Write the object to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(name = "remote", about = "Manage remote repositories")]
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    #[command(name = "push", about = "Fast-forward a remote branch to the local one")]
    Push {
        #[arg(default_value = DEFAULT_REMOTE)]
        remote: String,
        branch: Option<String>,
    },
    #[command(name = "pull", about = "Fast-forward a local branch to the remote one")]
    Pull {
        #[arg(default_value = DEFAULT_REMOTE)]
        remote: String,
        branch: Option<String>,
    },
    #[command(name = "clone", about = "Copy a repository into a new directory")]
    Clone { url: String, path: PathBuf },
}

#[derive(Subcommand)]
enum RemoteCommands {
    #[command(name = "add", about = "Register a remote repository")]
    Add { name: String, url: String },
    #[command(name = "list", about = "List registered remotes")]
    List,
}

fn parse_hash(value: &str) -> Result<HashAlgorithm, String> {
    HashAlgorithm::try_from(value).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Paths given on the command line are relative to the current directory
fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Plain filesystem URLs are stored absolute so they work from any directory
fn absolutize_url(cwd: &Path, url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        absolutize(cwd, Path::new(url)).display().to_string()
    }
}

fn open_repository(cwd: &Path) -> Result<Repository> {
    Repository::open(cwd, Box::new(std::io::stdout()))
        .with_context(|| format!("unable to open repository at {}", cwd.display()))
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("unable to read the current directory")?;
    let absolute = |paths: &[PathBuf]| {
        paths
            .iter()
            .map(|path| absolutize(&cwd, path))
            .collect::<Vec<_>>()
    };

    match &cli.command {
        Commands::Init { path, hash } => {
            let path = path
                .as_deref()
                .map(|path| absolutize(&cwd, path))
                .unwrap_or_else(|| cwd.clone());
            let mut repository = Repository::new(&path, Box::new(std::io::stdout()))?;

            repository.init(*hash)?
        }
        Commands::Add { paths } => open_repository(&cwd)?.add(&absolute(paths))?,
        Commands::Restore { staged, paths } => {
            if !staged {
                anyhow::bail!("only `restore --staged` is supported");
            }
            open_repository(&cwd)?.unstage(&absolute(paths))?
        }
        Commands::Rm { paths } => open_repository(&cwd)?.rm(&absolute(paths))?,
        Commands::Commit { message } => {
            open_repository(&cwd)?.commit(message)?;
        }
        Commands::Status { porcelain } => {
            open_repository(&cwd)?.status(*porcelain)?;
        }
        Commands::Log { max_count, oneline } => {
            let opts = LogOptions {
                max_count: *max_count,
                oneline: *oneline,
            };
            open_repository(&cwd)?.log(&opts)?;
        }
        Commands::Branch {
            name,
            start_point,
            delete,
        } => {
            let repository = open_repository(&cwd)?;
            match (name, delete) {
                (Some(name), true) => {
                    repository.delete_branch(name)?;
                }
                (Some(name), false) => {
                    repository.branch(name, start_point.as_deref())?;
                }
                (None, _) => {
                    repository.list_branches()?;
                }
            }
        }
        Commands::Checkout { target } => {
            open_repository(&cwd)?.checkout(target)?;
        }
        Commands::Diff { old, new } => {
            open_repository(&cwd)?.diff(&absolutize(&cwd, old), &absolutize(&cwd, new))?;
        }
        Commands::Apply { patch } => {
            open_repository(&cwd)?.apply(&absolutize(&cwd, patch))?;
        }
        Commands::CatFile { sha } => {
            open_repository(&cwd)?.cat_file(sha)?;
        }
        Commands::HashObject { write, file } => {
            open_repository(&cwd)?.hash_object(&absolutize(&cwd, file), *write)?;
        }
        Commands::Remote { command } => {
            let repository = open_repository(&cwd)?;
            match command {
                RemoteCommands::Add { name, url } => {
                    repository.remote_add(name, &absolutize_url(&cwd, url))?
                }
                RemoteCommands::List => {
                    repository.remote_list()?;
                }
            }
        }
        Commands::Push { remote, branch } => {
            open_repository(&cwd)?.push(remote, branch.as_deref())?;
        }
        Commands::Pull { remote, branch } => {
            open_repository(&cwd)?.pull(remote, branch.as_deref())?;
        }
        Commands::Clone { url, path } => {
            Repository::clone_remote(
                &absolutize_url(&cwd, url),
                &absolutize(&cwd, path),
                Box::new(std::io::stdout()),
            )?;
        }
    }

    Ok(())
}
