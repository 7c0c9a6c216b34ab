//! Test fixture helpers for creating test projects
//!
//! A fake project is a temp directory with a `.bundle-sizer.toml` and a
//! shell script standing in for rollup. The script reads the job from the
//! `ROLLUP_*` environment variables and writes artifacts of scripted sizes,
//! so reports are fully predictable.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use bundle_sizer::pipeline::PipelineConfig;

/// Re-export anyhow for convenience
pub use anyhow;

/// Project-relative path of the fake bundler
pub const FAKE_BUNDLER: &str = "bin/fake-rollup";

/// Log of `<target> <target-only>` lines, one per build
pub const CALL_LOG: &str = "calls.log";

/// What the fake bundler does for one target
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Write both artifacts
    Emit {
        /// Minified size
        min: u64,
        /// Gzipped size
        gz: u64,
    },
    /// Print to stderr and exit non-zero
    Fail {
        /// Exit status
        code: i32,
        /// stderr text
        stderr: String,
    },
    /// Write only the minified artifact
    SkipCompressed {
        /// Minified size
        min: u64,
    },
    /// Sleep, then write both artifacts
    Slow {
        /// Delay before writing
        secs: f32,
        /// Minified size
        min: u64,
        /// Gzipped size
        gz: u64,
    },
}

impl Behavior {
    fn script(&self) -> String {
        match self {
            Self::Emit { min, gz } => format!("emit {} {}", min, gz),
            Self::Fail { code, stderr } => {
                format!("echo '{}' >&2; exit {}", stderr.replace('\'', ""), code)
            }
            Self::SkipCompressed { min } => {
                format!("head -c {} /dev/zero > \"$ROLLUP_OUTPUT_FILE\"", min)
            }
            Self::Slow { secs, min, gz } => format!("sleep {}; emit {} {}", secs, min, gz),
        }
    }
}

/// Builder for [`FakeProject`]
#[derive(Debug, Clone)]
pub struct FakeProjectBuilder {
    targets: Vec<(String, Behavior)>,
    packages: Vec<String>,
    fallback: Behavior,
    write_packages: bool,
    extra_config: String,
    manifest: Option<String>,
}

impl FakeProjectBuilder {
    /// Package that builds to the given sizes
    pub fn package(mut self, name: &str, min: u64, gz: u64) -> Self {
        self.packages.push(name.to_string());
        self.targets.push((name.to_string(), Behavior::Emit { min, gz }));
        self
    }

    /// Package with custom behavior
    pub fn package_with(mut self, name: &str, behavior: Behavior) -> Self {
        self.packages.push(name.to_string());
        self.targets.push((name.to_string(), behavior));
        self
    }

    /// Sizes for the aggregate (`_all`) entry
    pub fn aggregate(mut self, min: u64, gz: u64) -> Self {
        self.targets.push(("_all".to_string(), Behavior::Emit { min, gz }));
        self
    }

    /// Behavior for targets without a scripted case
    pub fn fallback(mut self, behavior: Behavior) -> Self {
        self.fallback = behavior;
        self
    }

    /// Do not list the packages in the config file
    pub fn without_package_list(mut self) -> Self {
        self.write_packages = false;
        self
    }

    /// Append raw TOML to the config file
    pub fn config(mut self, toml: &str) -> Self {
        self.extra_config.push_str(toml);
        self.extra_config.push('\n');
        self
    }

    /// Write a package.json with these contents
    pub fn manifest(mut self, json: &str) -> Self {
        self.manifest = Some(json.to_string());
        self
    }

    /// Create the project on disk
    pub fn build(self) -> anyhow::Result<FakeProject> {
        let dir = TempDir::new()?;
        let root = dir.path();

        fs::create_dir_all(root.join("bin"))?;
        let bundler = root.join(FAKE_BUNDLER);
        fs::write(&bundler, self.bundler_script())?;
        make_executable(&bundler)?;

        fs::write(root.join(".bundle-sizer.toml"), self.config_toml())?;
        if let Some(ref manifest) = self.manifest {
            fs::write(root.join("package.json"), manifest)?;
        }

        Ok(FakeProject {
            dir,
            packages: self.packages,
        })
    }

    fn bundler_script(&self) -> String {
        let mut script = String::from(
            "#!/bin/sh\n\
             emit() {\n\
             \x20 head -c \"$1\" /dev/zero > \"$ROLLUP_OUTPUT_FILE\"\n\
             \x20 head -c \"$2\" /dev/zero > \"$ROLLUP_OUTPUT_FILE.gz\"\n\
             }\n\
             if [ \"$1\" = --version ]; then echo 'fake-rollup v0.0.0'; exit 0; fi\n\
             echo \"$ROLLUP_TARGET_NAME $ROLLUP_TARGET_ONLY\" >> calls.log\n\
             case \"$ROLLUP_TARGET_NAME\" in\n",
        );
        for (name, behavior) in &self.targets {
            let _ = writeln!(script, "  '{}') {} ;;", name, behavior.script());
        }
        let _ = writeln!(script, "  *) {} ;;", self.fallback.script());
        script.push_str("esac\n");
        script
    }

    fn config_toml(&self) -> String {
        let mut toml = String::new();
        if self.write_packages && !self.packages.is_empty() {
            let quoted: Vec<String> = self.packages.iter().map(|p| format!("{:?}", p)).collect();
            let _ = writeln!(toml, "packages = [{}]", quoted.join(", "));
        }
        toml.push_str(&self.extra_config);
        let _ = writeln!(toml, "\n[build]\nprogram = \"{}\"\nargs = []", FAKE_BUNDLER);
        toml
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// A project directory with a fake bundler
///
/// The TempDir is removed when this is dropped.
pub struct FakeProject {
    dir: TempDir,
    packages: Vec<String>,
}

impl FakeProject {
    /// Start a project; unscripted targets emit 100/50 bytes
    pub fn builder() -> FakeProjectBuilder {
        FakeProjectBuilder {
            targets: Vec::new(),
            packages: Vec::new(),
            fallback: Behavior::Emit { min: 100, gz: 50 },
            write_packages: true,
            extra_config: String::new(),
            manifest: None,
        }
    }

    /// Project root
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Default output directory
    pub fn out_dir(&self) -> PathBuf {
        self.dir.path().join("dist")
    }

    /// Packages added through the builder, in order
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Pipeline configuration pointing at the fake bundler
    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new(self.dir.path());
        config.build.program = PathBuf::from(FAKE_BUNDLER);
        config.build.args = Vec::new();
        config
    }

    /// `(target, target-only)` pairs the fake bundler was invoked with
    pub fn calls(&self) -> Vec<(String, String)> {
        fs::read_to_string(self.dir.path().join(CALL_LOG))
            .unwrap_or_default()
            .lines()
            .filter_map(|line| {
                let (target, only) = line.rsplit_once(' ')?;
                Some((target.to_string(), only.to_string()))
            })
            .collect()
    }
}
