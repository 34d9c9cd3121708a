use anyhow::Context;
use firewatch_core::prelude::ConsoleSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Fixed seed for a reproducible session; entropy when absent.
    pub seed: Option<u64>,
    pub bind: SocketAddr,
    pub export_dir: PathBuf,
    pub console: ConsoleSettings,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            export_dir: PathBuf::from("tools/data"),
            console: ConsoleSettings::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulator config {}", path_ref.display()))?;
        let config: SimulatorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulator config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn apply_overrides(
        &mut self,
        seed: Option<u64>,
        bind: Option<SocketAddr>,
        export_dir: Option<PathBuf>,
    ) {
        if seed.is_some() {
            self.seed = seed;
        }
        if let Some(bind) = bind {
            self.bind = bind;
        }
        if let Some(export_dir) = export_dir {
            self.export_dir = export_dir;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.console
            .validate()
            .context("validating console settings")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_partial_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"seed: 42\nbind: 127.0.0.1:9100\nconsole:\n  selection_epsilon_deg: 0.01\n  impact:\n    high_threshold: 1.2\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = SimulatorConfig::load(&path).unwrap();
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.bind.port(), 9100);
        assert_eq!(cfg.console.selection_epsilon_deg, 0.01);
        assert_eq!(cfg.console.impact.high_threshold, 1.2);
        assert_eq!(cfg.console.impact.medium_threshold, 0.55);
        assert_eq!(cfg.console.analysis_delay_ms.min_ms, 2000);
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let mut cfg = SimulatorConfig::default();
        cfg.apply_overrides(Some(7), None, Some(PathBuf::from("out")));
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.bind.port(), 9000);
        assert_eq!(cfg.export_dir, PathBuf::from("out"));
    }

    #[test]
    fn invalid_console_settings_fail_validation() {
        let mut cfg = SimulatorConfig::default();
        cfg.console.confidence_pct.min = 95;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/simulator.yaml");
        let cfg = SimulatorConfig::load(&path).unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.seed, Some(2024));
        assert_eq!(cfg.console.impact.base_radius_m.high, 2200.0);
    }
}
