//! The provisioning pipeline
//!
//! Sequences the stages that turn a directory name into a working AGP
//! workspace: input validation, project resolution, cloning, setup,
//! front-end build, local alias registration, environment setup, and
//! the database install. Fatal stages abort the run with an error;
//! best-effort stages report and let the run continue.
//!
//! The whole run races against Ctrl-C. On interrupt the in-flight
//! subprocess is killed and [`Pipeline::rollback`] removes everything
//! the run created so far.

use console::style;
use tracing::debug;

use agp_core::envfile::{self, EnvAssignment};
use agp_core::output;
use agp_core::process::{self, ProcessResult};

use crate::catalog::CatalogClient;
use crate::config::ProvisionConfig;
use crate::context::ProvisioningContext;
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use crate::token::TokenStore;
use crate::{frontend, git, matcher, valet};
use crate::{COMMAND_TIMEOUT, LONG_TIMEOUT};

/// Setup script expected in the core directory
const SETUP_SCRIPT: &str = "setupproject.php";

/// Fallback domain when no local alias is available
const FALLBACK_DOMAIN: &str = "artemeon.de";

const BANNER: &str = r#"
    _    ____ ____
   / \  / ___|  _ \
  / _ \| |  _| |_) |
 / ___ \ |_| |  __/
/_/   \_\____|_|
"#;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// All applicable stages completed
    Completed,
    /// The user interrupted the run; rollback has already happened
    Interrupted,
}

/// Orchestrates one provisioning run
pub struct Pipeline<P: Prompter> {
    config: ProvisionConfig,
    prompter: P,
    catalog: CatalogClient,
}

impl<P: Prompter> Pipeline<P> {
    pub fn new(config: ProvisionConfig, prompter: P) -> Self {
        let catalog = CatalogClient::new(&config.api_base_url);
        Self {
            config,
            prompter,
            catalog,
        }
    }

    /// Provision the workspace `name`, racing against Ctrl-C
    pub async fn run(
        self,
        name: &str,
        branch: Option<String>,
        select_project: bool,
    ) -> Result<RunOutcome> {
        let mut ctx = ProvisioningContext::new(&self.config, name, branch);

        let outcome = tokio::select! {
            result = self.execute(&mut ctx, select_project) => Some(result),
            _ = tokio::signal::ctrl_c() => None,
        };

        match outcome {
            // Ctrl-C at a prompt surfaces as an error instead of a signal
            Some(Err(err)) if err.is_interrupt() => {
                println!();
                self.rollback(&ctx).await;
                Ok(RunOutcome::Interrupted)
            }
            Some(result) => result.map(|_| RunOutcome::Completed),
            None => {
                println!();
                self.rollback(&ctx).await;
                Ok(RunOutcome::Interrupted)
            }
        }
    }

    async fn execute(&self, ctx: &mut ProvisioningContext, select_project: bool) -> Result<()> {
        if ctx.target_name.contains('/') {
            return Err(Error::InvalidProjectName);
        }
        if ctx.working_directory.is_dir() {
            return Err(Error::directory_exists(&ctx.target_name));
        }

        print_banner();

        if select_project {
            self.resolve_named_project(ctx).await?;
        }
        if let Some(project) = ctx.project_name.clone() {
            self.clone_named_project(ctx, &project).await?;
        }
        if !ctx.is_named_project_clone {
            self.create_and_clone_base(ctx).await?;
        }

        let mut frontend_due = ctx.is_named_project_clone;
        if !ctx.is_named_project_clone && self.run_setup_script(ctx).await? {
            frontend_due = true;
        }
        if frontend_due {
            self.build_frontend(ctx).await;
        }

        if self.config.alias_setup_enabled {
            self.register_local_alias(ctx).await;
        }

        if ctx.is_named_project_clone {
            self.install_project_dependencies(ctx).await?;
        }

        self.configure_environment(ctx).await?;

        if !ctx.is_named_project_clone && ctx.env_updated {
            if let Some(database) = ctx.database_name.clone() {
                if !database.is_empty() {
                    self.install_database(ctx, &database).await?;
                }
            }
        }

        self.summarize(ctx).await;
        Ok(())
    }

    /// Figure out which project repository to clone, if any
    ///
    /// Needs a token and the catalog; with a catalog the best fuzzy
    /// match is offered first, then the full list. Without one the
    /// name is asked for directly. An empty answer means "no project".
    /// Non-interactive runs still work with a stored token: the best
    /// match is accepted without asking, matching the confirm default.
    async fn resolve_named_project(&self, ctx: &mut ProvisioningContext) -> Result<()> {
        let store = TokenStore::new(&self.config.home_dir);
        let token = if self.config.interactive {
            store.get_or_ask(&self.prompter)?
        } else {
            match store.get()? {
                Some(token) => token,
                None => {
                    output::warning(
                        "Project selection needs a stored GitHub token in non-interactive runs, continuing with the base repository.",
                    );
                    return Ok(());
                }
            }
        };

        let mut projects = Vec::new();
        if !token.is_empty() {
            output::info("Fetching available projects from GitHub ...");
            let spinner = output::spinner("Querying the project catalog");
            projects = self.catalog.fetch_project_names(&token).await;
            spinner.finish_and_clear();
            debug!("Found {} project repositories.", projects.len());
        }

        let project = if projects.is_empty() {
            if !self.config.interactive {
                output::warning(
                    "The project catalog is unavailable, continuing with the base repository.",
                );
                return Ok(());
            }
            self.prompter
                .ask("Which project do you want to checkout?", None)?
        } else {
            match matcher::closest(&ctx.target_name, &projects) {
                Some(best) if !self.config.interactive => best.to_string(),
                Some(best)
                    if self
                        .prompter
                        .confirm(&format!("Do you want to checkout \"{best}\"?"), true)? =>
                {
                    best.to_string()
                }
                _ => self
                    .prompter
                    .choose("Which project do you want to checkout?", &projects)?,
            }
        };

        if !project.is_empty() {
            ctx.project_name = Some(project);
        }
        Ok(())
    }

    /// Clone a named project repository into the workspace, fatal on failure
    async fn clone_named_project(
        &self,
        ctx: &mut ProvisioningContext,
        project: &str,
    ) -> Result<()> {
        let existed_before = ctx.working_directory.is_dir();
        output::info(&format!(
            "Cloning \"{project}\" into \"{}\" ...",
            ctx.target_name
        ));

        let url = format!("{}/{project}.git", self.config.project_repo_base_url);
        let options = git::CloneOptions {
            branch: ctx.branch.clone(),
            recurse_submodules: true,
        };
        let result =
            git::clone_repository(&url, &ctx.target_name, Some(&self.config.current_dir), &options)
                .await?;

        if !result.success() {
            // Leave no half-created directory behind
            if !existed_before && ctx.working_directory.is_dir() {
                if let Err(err) = std::fs::remove_dir(&ctx.working_directory) {
                    debug!("Could not remove \"{}\": {err}", ctx.working_directory);
                }
            }
            return Err(Error::project_clone_failed(project, result.stderr));
        }

        ctx.is_named_project_clone = true;
        ctx.cleanup_armed = true;
        debug!("Cloned \"{project}\" into \"{}\".", ctx.target_name);
        Ok(())
    }

    /// Create the workspace directory and clone the base repository into
    /// `core`, fatal on failure
    async fn create_and_clone_base(&self, ctx: &mut ProvisioningContext) -> Result<()> {
        if let Err(err) = std::fs::create_dir(&ctx.working_directory) {
            if err.kind() != std::io::ErrorKind::AlreadyExists
                || !ctx.working_directory.is_dir()
            {
                return Err(Error::directory_not_created(&ctx.target_name, err));
            }
        }
        ctx.cleanup_armed = true;
        debug!("Directory \"{}\" created.", ctx.target_name);

        output::info(&format!(
            "Cloning repository into \"{}/core\" ...",
            ctx.target_name
        ));
        let options = git::CloneOptions {
            branch: ctx.branch.clone(),
            recurse_submodules: false,
        };
        let result = git::clone_repository(
            &self.config.base_repo_url,
            "core",
            Some(&ctx.working_directory),
            &options,
        )
        .await?;

        if !result.success() {
            return Err(Error::base_clone_failed(result.stderr));
        }
        debug!("Repository cloned into \"{}/core\".", ctx.target_name);
        Ok(())
    }

    /// Run the setup script when the core ships one, fatal on failure
    ///
    /// Returns whether the script ran.
    async fn run_setup_script(&self, ctx: &ProvisioningContext) -> Result<bool> {
        if !ctx.core_directory.join(SETUP_SCRIPT).is_file() {
            return Ok(false);
        }

        output::info("Setting up project ...");
        let result = process::run(
            &["php", "-f", SETUP_SCRIPT, "skip-frontend-build"],
            Some(&ctx.core_directory),
            Some(LONG_TIMEOUT),
        )
        .await?;

        if !result.success() {
            return Err(Error::setup_failed(result.stderr));
        }
        debug!("Project set up.");
        Ok(true)
    }

    /// Install and build the front-end assets, best-effort
    async fn build_frontend(&self, ctx: &ProvisioningContext) {
        match frontend::detect().await {
            Ok(true) => {}
            Ok(false) => {
                debug!("pnpm is not available, skipping the front-end build.");
                return;
            }
            Err(err) => {
                debug!("Front-end probe failed: {err}");
                return;
            }
        }

        output::info("Installing front-end dependencies ...");
        let install = match frontend::install(&ctx.core_directory).await {
            Ok(result) => result,
            Err(err) => {
                output::error(&format!("An error occurred while installing the dependencies: {err}"));
                return;
            }
        };
        if !install.success() {
            output::error("An error occurred while installing the dependencies.");
            dump_stderr(&install);
            return;
        }
        debug!("Front-end dependencies installed.");

        output::info("Building front-end ...");
        let build = match frontend::build(&ctx.core_directory).await {
            Ok(result) => result,
            Err(err) => {
                output::error(&format!("An error occurred while building the front-end: {err}"));
                return;
            }
        };
        if !build.success() {
            output::error("An error occurred while building the front-end.");
            dump_stderr(&build);
            return;
        }
        debug!("Front-end built.");
    }

    /// Register the workspace as a local Valet site, best-effort
    async fn register_local_alias(&self, ctx: &mut ProvisioningContext) {
        match self.setup_local_alias(ctx).await {
            Ok(true) => {
                ctx.local_alias_available = true;
                ctx.cleanup_armed = true;
                debug!("Laravel Valet site set up.");
            }
            Ok(false) => debug!("Laravel Valet is not available, skipping the site setup."),
            Err(err) => output::error(&err.to_string()),
        }
    }

    async fn setup_local_alias(&self, ctx: &ProvisioningContext) -> Result<bool> {
        let Some(valet_info) = valet::probe().await? else {
            return Ok(false);
        };
        println!("{}", valet_info.banner);

        if !valet::driver_present(&self.config.home_dir) {
            output::info("Cloning AGP Valet Driver ...");
            debug!("{}", valet::drivers_dir(&self.config.home_dir));
            let branch = valet::driver_branch(valet_info.version.as_ref());
            let result =
                valet::clone_driver(&self.config.driver_repo_url, &self.config.home_dir, branch)
                    .await?;
            if !result.success() {
                debug!("Driver clone failed: {}", result.stderr.trim());
            }
        }

        let parked = valet::parked_paths().await?;
        let is_parked = parked
            .iter()
            .any(|path| path == self.config.current_dir.as_str());

        output::info("Setting up Laravel Valet site ...");
        let result = if is_parked {
            valet::secure(&ctx.working_directory).await?
        } else {
            valet::link_secure(&ctx.working_directory).await?
        };
        if result.success() {
            debug!("{}", result.stdout_trimmed());
        } else {
            output::error(result.stderr.trim());
        }

        if let Some(php_version) = valet::platform_php(&ctx.core_directory)? {
            output::info(&format!("Isolating site to use {php_version} ..."));
            let result = valet::isolate(&ctx.working_directory, &php_version).await?;
            if result.success() {
                debug!("The site now uses {php_version}.");
            } else {
                debug!("Isolation failed: {}", result.stderr.trim());
            }
        }

        Ok(true)
    }

    /// Install Composer dependencies of a named project, fatal on failure
    async fn install_project_dependencies(&self, ctx: &ProvisioningContext) -> Result<()> {
        output::info("Installing Composer dependencies ...");
        let project_dir = ctx.working_directory.join("project");
        let result =
            process::run(&["composer", "install"], Some(&project_dir), Some(LONG_TIMEOUT)).await?;

        if !result.success() {
            return Err(Error::composer_install_failed(result.stderr));
        }
        debug!("Composer dependencies installed.");
        Ok(())
    }

    /// Create `.env` from its example and fill in the workspace values
    ///
    /// The copy always happens when the example exists and no `.env` is
    /// in the way; the prompts and the rewrite need an interactive run.
    async fn configure_environment(&self, ctx: &mut ProvisioningContext) -> Result<()> {
        let default_web_root = self.default_web_root(ctx).await;
        if ctx.local_alias_available {
            ctx.web_root = Some(default_web_root.clone());
        }

        let example = ctx.working_directory.join(".env.example");
        let env_file = ctx.working_directory.join(".env");
        if !example.is_file() || env_file.is_file() {
            return Ok(());
        }

        output::section("Environment Setup");
        std::fs::copy(&example, &env_file)?;
        debug!(
            "\"{}/.env.example\" copied to \"{}/.env\".",
            ctx.target_name, ctx.target_name
        );

        if !self.config.interactive {
            return Ok(());
        }

        let web_root = match ctx.web_root.clone() {
            Some(web_root) => web_root,
            None => {
                let answer = self.prompter.ask("Web root", Some(&default_web_root))?;
                ctx.web_root = Some(answer.clone());
                answer
            }
        };
        // Written right away so an aborted prompt session still leaves the URL behind
        envfile::apply(&env_file, &[EnvAssignment::new("AGP_URL", web_root.as_str())])?;

        let db_host = self.prompter.ask("Database Host", Some("127.0.0.1"))?;
        let db_user = self.prompter.ask("Database Username", Some("root"))?;
        let db_password = self.prompter.ask_secret("Database Password")?;
        let database = self.prompter.ask("Database Name", Some(&ctx.target_name))?;
        println!();

        envfile::apply(
            &env_file,
            &[
                EnvAssignment::new("AGP_URL", web_root.as_str()),
                EnvAssignment::new("AGP_DB_HOST", db_host),
                EnvAssignment::new("AGP_DB_USER", db_user),
                EnvAssignment::new("AGP_DB_PW", db_password),
                EnvAssignment::new("AGP_DB_DB", database.clone()),
            ],
        )?;

        output::info(&format!("\"{}/.env\" updated.", ctx.target_name));
        ctx.env_updated = true;
        ctx.database_name = Some(database);
        Ok(())
    }

    async fn default_web_root(&self, ctx: &ProvisioningContext) -> String {
        if ctx.local_alias_available {
            if let Ok(tld) = valet::tld().await {
                if !tld.is_empty() {
                    return format!("{}.{tld}", ctx.target_name);
                }
            }
        }
        format!("{}.{FALLBACK_DOMAIN}/", ctx.target_name)
    }

    /// Run the database installer of the core, fatal on failure
    async fn install_database(&self, ctx: &ProvisioningContext, database: &str) -> Result<()> {
        output::info(&format!("Installing AGP into database \"{database}\" ..."));
        let result = process::run_shell(
            "php console.php install",
            Some(&ctx.working_directory),
            Some(LONG_TIMEOUT),
        )
        .await?;

        if !result.success() {
            return Err(Error::database_install_failed(result.stderr));
        }
        debug!("AGP installed into database \"{database}\".");
        Ok(())
    }

    /// Closing summary, with a browser launch for fresh base workspaces
    async fn summarize(&self, ctx: &ProvisioningContext) {
        output::section("Summary");
        output::success("Done.");
        debug!("Finished after {} seconds.", ctx.started.elapsed().as_secs());

        let Some(web_root) = &ctx.web_root else {
            return;
        };
        let url = format!("https://{web_root}");
        output::info(&format!("🌐 {url}"));

        if ctx.is_named_project_clone
            || !ctx.local_alias_available
            || !self.config.open_browser
        {
            return;
        }
        let Some(user) = &self.config.invoking_user else {
            return;
        };
        let argv = ["sudo", "-u", user.as_str(), "open", url.as_str()];
        match process::run(&argv, None, Some(COMMAND_TIMEOUT)).await {
            Ok(result) if !result.success() => {
                debug!("Browser launch exited with {}", result.exit_code);
            }
            Ok(_) => {}
            Err(err) => debug!("Browser launch failed: {err}"),
        }
    }

    /// Best-effort cleanup after an interrupt
    ///
    /// Unregisters the Valet site if one was set up, then removes the
    /// workspace without following symlinks. Does nothing unless a
    /// stage with side effects already ran.
    pub async fn rollback(&self, ctx: &ProvisioningContext) {
        if !ctx.cleanup_armed || !ctx.working_directory.is_dir() {
            return;
        }

        println!("🧹 Cleaning up the mess ...");
        if ctx.local_alias_available {
            valet::unregister(&ctx.working_directory).await;
        }
        match agp_core::fs::remove_tree(&ctx.working_directory) {
            Ok(()) => println!("✨ You're good to go."),
            Err(err) => output::warning(&format!(
                "Could not remove \"{}\": {err}",
                ctx.working_directory
            )),
        }
    }
}

fn print_banner() {
    for line in BANNER.lines() {
        println!("{}", style(line).blue());
    }
    println!("{}\n", style("The AGP workspace installer").dim());
}

fn dump_stderr(result: &ProcessResult) {
    let stderr = result.stderr.trim_end();
    if !stderr.is_empty() {
        eprintln!("{stderr}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompter;
    use camino::{Utf8Path, Utf8PathBuf};

    fn utf8(path: &std::path::Path) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(path.to_path_buf()).unwrap()
    }

    fn test_config(root: &Utf8Path) -> ProvisionConfig {
        let mut config = ProvisionConfig::new(root.to_path_buf(), root.join("home"));
        config.alias_setup_enabled = false;
        config.open_browser = false;
        config
    }

    fn scripted(config: ProvisionConfig, answers: &[&str]) -> Pipeline<ScriptedPrompter> {
        Pipeline::new(config, ScriptedPrompter::new(answers.iter().copied()))
    }

    #[tokio::test]
    async fn rejects_names_containing_slashes() {
        let root = tempfile::tempdir().unwrap();
        let pipeline = scripted(test_config(&utf8(root.path())), &[]);

        let result = pipeline.run("bad/name", None, false).await;

        match result {
            Err(err) => assert!(err.is_invalid_input()),
            Ok(_) => panic!("expected rejection"),
        }
        assert!(!root.path().join("bad").exists());
    }

    #[tokio::test]
    async fn rejects_existing_directories() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("my-app")).unwrap();
        std::fs::write(root.path().join("my-app/marker.txt"), "keep").unwrap();
        let pipeline = scripted(test_config(&utf8(root.path())), &[]);

        let result = pipeline.run("my-app", None, false).await;

        assert!(matches!(result, Err(Error::DirectoryExists { .. })));
        assert!(root.path().join("my-app/marker.txt").exists());
    }

    #[tokio::test]
    async fn non_interactive_env_setup_only_copies_the_example() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("my-app");
        std::fs::create_dir_all(&workdir).unwrap();
        let example = "AGP_URL=\nAGP_DB_HOST=\nAGP_DB_USER=\nAGP_DB_PW=\nAGP_DB_DB=\n";
        std::fs::write(workdir.join(".env.example"), example).unwrap();

        let mut config = test_config(&utf8(root.path()));
        config.interactive = false;
        let pipeline = scripted(config, &[]);
        let mut ctx = ProvisioningContext::new(&pipeline.config, "my-app", None);

        pipeline.configure_environment(&mut ctx).await.unwrap();

        let env = std::fs::read_to_string(workdir.join(".env")).unwrap();
        assert_eq!(env, example);
        assert!(!ctx.env_updated);
        assert_eq!(ctx.database_name, None);
    }

    #[tokio::test]
    async fn interactive_env_setup_rewrites_connection_values() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("my-app");
        std::fs::create_dir_all(&workdir).unwrap();
        std::fs::write(
            workdir.join(".env.example"),
            "AGP_URL=\nAGP_DB_HOST=\nAGP_DB_USER=\nAGP_DB_PW=\nAGP_DB_DB=\n",
        )
        .unwrap();

        // Defaults for web root, host, and user; explicit password; default database
        let pipeline = scripted(test_config(&utf8(root.path())), &["", "", "", "s3cret", ""]);
        let mut ctx = ProvisioningContext::new(&pipeline.config, "my-app", None);

        pipeline.configure_environment(&mut ctx).await.unwrap();

        let env = std::fs::read_to_string(workdir.join(".env")).unwrap();
        assert_eq!(
            env,
            "AGP_URL=my-app.artemeon.de/\nAGP_DB_HOST=127.0.0.1\nAGP_DB_USER=root\nAGP_DB_PW=s3cret\nAGP_DB_DB=my-app\n"
        );
        assert!(ctx.env_updated);
        assert_eq!(ctx.database_name.as_deref(), Some("my-app"));
        assert_eq!(ctx.web_root.as_deref(), Some("my-app.artemeon.de/"));
    }

    #[tokio::test]
    async fn existing_env_file_is_left_alone() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("my-app");
        std::fs::create_dir_all(&workdir).unwrap();
        std::fs::write(workdir.join(".env.example"), "AGP_URL=\n").unwrap();
        std::fs::write(workdir.join(".env"), "AGP_URL=custom.test\n").unwrap();

        // An empty script makes any unexpected prompt an error
        let pipeline = scripted(test_config(&utf8(root.path())), &[]);
        let mut ctx = ProvisioningContext::new(&pipeline.config, "my-app", None);

        pipeline.configure_environment(&mut ctx).await.unwrap();

        let env = std::fs::read_to_string(workdir.join(".env")).unwrap();
        assert_eq!(env, "AGP_URL=custom.test\n");
        assert!(!ctx.env_updated);
    }

    #[tokio::test]
    async fn missing_example_skips_environment_setup() {
        let root = tempfile::tempdir().unwrap();
        let workdir = root.path().join("my-app");
        std::fs::create_dir_all(&workdir).unwrap();

        let pipeline = scripted(test_config(&utf8(root.path())), &[]);
        let mut ctx = ProvisioningContext::new(&pipeline.config, "my-app", None);

        pipeline.configure_environment(&mut ctx).await.unwrap();

        assert!(!workdir.join(".env").exists());
        assert!(!ctx.env_updated);
    }
}
