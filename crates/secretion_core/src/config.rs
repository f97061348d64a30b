//! Configuration of a secretion run.
//!
//! Every model parameter can be set from a `config.toml`; missing sections
//! fall back to the `Default` impl, which carries the reference β-cell model.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [cell]
//! radius = 30250.0
//! nucleus_radius = 18340.0
//!
//! [channels]
//! count = 451
//! trough = 3
//! peak = 450
//! oscillation = 80
//!
//! [secretion]
//! ready_state = 100
//!
//! [run]
//! periodicity = 10
//! seed = 42
//! ```

use serde::{Deserialize, Serialize};

/// Cell geometry, in Å. Cell and nucleus share the origin as center.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CellConfig {
    pub radius: f64,
    pub nucleus_radius: f64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            radius: 30250.0,
            nucleus_radius: 18340.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VesicleConfig {
    pub count: usize,
    pub radius: f64,
    /// Largest random displacement per axis and tick, Å.
    pub step: f64,
    /// Drift per unit force, Å² mol/kcal.
    pub mobility: f64,
}

impl Default for VesicleConfig {
    fn default() -> Self {
        Self {
            count: 200,
            radius: 1200.0,
            // sqrt(2 D dt) for D = 2.3e-10 Å²/fs and a 10 ms step.
            step: 68.0,
            mobility: 1.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    pub count: usize,
    /// Radius of the Ca2+ microdomain, Å.
    pub radius: f64,
    pub trough: usize,
    pub peak: usize,
    /// Closed age that triggers the next phase switch.
    pub oscillation: u32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            count: 451,
            radius: 100.0,
            trough: 3,
            peak: 450,
            oscillation: 80,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DockingConfig {
    pub contact_range: f64,
    pub slack: f64,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            contact_range: 100.0,
            slack: 10.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SecretionConfig {
    pub ready_state: u32,
    /// Width of the shell around the nucleus where secreted vesicles reappear.
    pub cut_off: f64,
    pub max_placement_attempts: usize,
}

impl Default for SecretionConfig {
    fn default() -> Self {
        let cell = CellConfig::default();
        Self {
            ready_state: 100,
            cut_off: (cell.radius - cell.nucleus_radius) / 3.0,
            max_placement_attempts: 10_000,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PotentialConfig {
    /// Strength of the pull toward the periphery, kcal/mol/Å.
    pub k_traffic: f64,
    pub k_rdf: f64,
    /// Fifth-order fit, highest order first.
    pub rdf_coefficients: [f64; 6],
}

impl Default for PotentialConfig {
    fn default() -> Self {
        Self {
            k_traffic: 0.0,
            k_rdf: 0.0,
            rdf_coefficients: [-1.524e-20, 9.173e-16, -2.092e-11, 2.202e-07, -1.141e-03, 3.492],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub ticks: u64,
    /// Ticks between two task updates.
    pub periodicity: u64,
    pub record_interval: u64,
    pub seed: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: 1000,
            periodicity: 10,
            record_interval: 10,
            seed: None,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub cell: CellConfig,
    pub vesicles: VesicleConfig,
    pub channels: ChannelConfig,
    pub docking: DockingConfig,
    pub secretion: SecretionConfig,
    pub potentials: PotentialConfig,
    pub run: RunConfig,
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns `Ok(())` if all parameters are valid, or `Err` with a description
    /// of the first validation failure.
    pub fn validate(&self) -> anyhow::Result<()> {
        // Geometry
        anyhow::ensure!(self.cell.nucleus_radius > 0.0, "Nucleus radius must be positive");
        anyhow::ensure!(
            self.cell.radius > self.cell.nucleus_radius,
            "Cell radius must exceed the nucleus radius"
        );
        anyhow::ensure!(self.vesicles.radius > 0.0, "Vesicle radius must be positive");
        anyhow::ensure!(
            self.cell.radius - self.cell.nucleus_radius > 2.0 * self.vesicles.radius,
            "Cytoplasm is too thin to hold a vesicle"
        );
        anyhow::ensure!(
            u32::try_from(self.vesicles.count).is_ok() && u32::try_from(self.channels.count).is_ok(),
            "Entity counts must fit in a 32-bit id"
        );
        anyhow::ensure!(self.vesicles.step >= 0.0, "Vesicle step must be non-negative");
        anyhow::ensure!(self.vesicles.mobility >= 0.0, "Vesicle mobility must be non-negative");

        // Channels
        anyhow::ensure!(self.channels.radius >= 0.0, "Channel radius must be non-negative");
        anyhow::ensure!(
            self.channels.trough <= self.channels.count && self.channels.peak <= self.channels.count,
            "Trough and peak sizes must not exceed the channel count"
        );
        anyhow::ensure!(
            self.channels.trough != self.channels.peak,
            "Trough and peak sizes must differ"
        );

        // Docking
        anyhow::ensure!(self.docking.contact_range >= 0.0, "Contact range must be non-negative");
        anyhow::ensure!(self.docking.slack >= 0.0, "Slack must be non-negative");

        // Secretion
        anyhow::ensure!(self.secretion.ready_state >= 1, "Ready state must be at least 1");
        anyhow::ensure!(
            self.secretion.cut_off > 2.0 * self.vesicles.radius,
            "Secretion cut-off must exceed the vesicle diameter"
        );
        anyhow::ensure!(
            self.secretion.max_placement_attempts > 0,
            "Max placement attempts must be positive"
        );

        // Run
        anyhow::ensure!(self.run.periodicity >= 1, "Periodicity must be at least 1");
        anyhow::ensure!(self.run.record_interval >= 1, "Record interval must be at least 1");

        Ok(())
    }

    /// Parses and validates a `config.toml`.
    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Digest of the model parameters. Run settings are left out so that
    /// runs of one model with different lengths or seeds share a fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.cell).as_bytes());
        hasher.update(format!("{:?}", self.vesicles).as_bytes());
        hasher.update(format!("{:?}", self.channels).as_bytes());
        hasher.update(format!("{:?}", self.docking).as_bytes());
        hasher.update(format!("{:?}", self.secretion).as_bytes());
        hasher.update(format!("{:?}", self.potentials).as_bytes());
        hasher.update(self.run.periodicity.to_le_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.secretion.cut_off - 3970.0).abs() < 1e-9);
    }

    #[test]
    fn test_cut_off_must_exceed_vesicle_diameter() {
        let config = AppConfig {
            secretion: SecretionConfig {
                cut_off: 2400.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_phase_sizes_bounded_by_channel_count() {
        let config = AppConfig {
            channels: ChannelConfig {
                count: 10,
                trough: 2,
                peak: 11,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_phase_sizes_rejected() {
        let config = AppConfig {
            channels: ChannelConfig {
                trough: 5,
                peak: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_counts_past_id_range_rejected() {
        let mut config = AppConfig::default();
        config.vesicles.count = u32::MAX as usize + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_periodicity_rejected() {
        let config = AppConfig {
            run: RunConfig {
                periodicity: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [channels]
            count = 20
            trough = 1
            peak = 8

            [run]
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.channels.count, 20);
        assert_eq!(config.channels.oscillation, 80);
        assert_eq!(config.run.seed, Some(7));
        assert_eq!(config.vesicles, VesicleConfig::default());
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        assert!(AppConfig::from_toml("[secretion]\nready_state = 0\n").is_err());
        assert!(AppConfig::from_toml("[cell\nradius = 1").is_err());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let config1 = AppConfig::default();
        let mut config2 = AppConfig::default();
        config2.run.seed = Some(3);
        config2.run.ticks = 5;
        assert_eq!(config1.fingerprint(), config2.fingerprint());

        config2.secretion.ready_state = 50;
        assert_ne!(config1.fingerprint(), config2.fingerprint());
    }
}
