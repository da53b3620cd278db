//! Training schedule configuration format.

use crate::common::*;

pub use optim::*;
pub use scheduler::*;
pub use train_loop::*;

/// The training schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub train_cfg: TrainLoopConfig,
    #[serde(default)]
    pub val_cfg: Option<ValLoopConfig>,
    #[serde(default)]
    pub test_cfg: Option<TestLoopConfig>,
    /// Learning rate schedulers, applied in order.
    #[serde(default)]
    pub param_scheduler: Vec<ParamScheduler>,
    pub optim_wrapper: OptimWrapperConfig,
    #[serde(default)]
    pub auto_scale_lr: AutoScaleLr,
}

impl ScheduleConfig {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)?;
        config
            .validate()
            .with_context(|| format!("invalid schedule '{}'", path.display()))?;
        debug!("loaded schedule '{}'", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.train_cfg.validate()?;
        self.param_scheduler
            .iter()
            .try_for_each(|scheduler| scheduler.validate())?;
        self.optim_wrapper.validate()?;
        self.auto_scale_lr.validate()?;
        Ok(())
    }

    /// The epochs, or iterations for iteration-based loops, after which
    /// validation runs.
    pub fn validation_epochs(&self) -> Vec<usize> {
        if self.val_cfg.is_none() {
            return vec![];
        }
        self.train_cfg.validation_points()
    }

    /// The base learning rate after the linear scaling rule for the total
    /// batch size.
    pub fn scaled_lr(&self, batch_size: usize) -> R64 {
        self.auto_scale_lr
            .scale(self.optim_wrapper.optimizer.lr(), batch_size)
    }
}

mod train_loop {
    use super::*;

    /// The training loop.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum TrainLoopConfig {
        EpochBasedTrainLoop {
            max_epochs: usize,
            val_interval: usize,
            #[serde(default = "default_val_begin")]
            val_begin: usize,
        },
        IterBasedTrainLoop {
            max_iters: usize,
            val_interval: usize,
            #[serde(default = "default_val_begin")]
            val_begin: usize,
        },
    }

    impl TrainLoopConfig {
        pub fn validate(&self) -> Result<()> {
            let (max, val_interval, val_begin) = self.params();
            ensure!(max > 0, "the training length must be positive");
            ensure!(val_interval > 0, "val_interval must be positive");
            ensure!(val_begin > 0, "val_begin must be positive");
            Ok(())
        }

        /// The total number of epochs or iterations.
        pub fn max_length(&self) -> usize {
            self.params().0
        }

        pub fn by_epoch(&self) -> bool {
            matches!(self, Self::EpochBasedTrainLoop { .. })
        }

        /// Points from `val_begin` on that are a multiple of `val_interval`,
        /// plus the last one.
        pub fn validation_points(&self) -> Vec<usize> {
            let (max, val_interval, val_begin) = self.params();
            if val_interval == 0 {
                return vec![];
            }
            (val_begin.max(1)..=max)
                .filter(|&point| point % val_interval == 0 || point == max)
                .collect()
        }

        fn params(&self) -> (usize, usize, usize) {
            match *self {
                Self::EpochBasedTrainLoop {
                    max_epochs,
                    val_interval,
                    val_begin,
                } => (max_epochs, val_interval, val_begin),
                Self::IterBasedTrainLoop {
                    max_iters,
                    val_interval,
                    val_begin,
                } => (max_iters, val_interval, val_begin),
            }
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum ValLoopConfig {
        ValLoop,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum TestLoopConfig {
        TestLoop,
    }

    fn default_val_begin() -> usize {
        1
    }
}

mod scheduler {
    use super::*;

    /// A learning rate scheduler active within `[begin, end)`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum ParamScheduler {
        /// Linearly warms the factor up from `start_factor` to 1.
        #[serde(rename = "LinearLR")]
        Linear {
            start_factor: R64,
            by_epoch: bool,
            begin: usize,
            end: usize,
        },
        /// Multiplies the rate by `gamma` at each milestone.
        #[serde(rename = "MultiStepLR")]
        MultiStep {
            by_epoch: bool,
            begin: usize,
            end: usize,
            milestones: Vec<usize>,
            gamma: R64,
        },
    }

    impl ParamScheduler {
        pub fn validate(&self) -> Result<()> {
            let (begin, end) = self.range();
            ensure!(
                begin < end,
                "scheduler begin ({}) must be less than end ({})",
                begin,
                end
            );

            match self {
                Self::Linear { start_factor, .. } => {
                    ensure!(
                        *start_factor > 0.0 && *start_factor <= 1.0,
                        "start_factor must be in range (0, 1]"
                    );
                }
                Self::MultiStep {
                    milestones, gamma, ..
                } => {
                    ensure!(
                        milestones.iter().tuple_windows().all(|(lhs, rhs)| lhs < rhs),
                        "milestones must be strictly increasing"
                    );
                    ensure!(*gamma > 0.0, "gamma must be positive");
                }
            }
            Ok(())
        }

        pub fn range(&self) -> (usize, usize) {
            match *self {
                Self::Linear { begin, end, .. } => (begin, end),
                Self::MultiStep { begin, end, .. } => (begin, end),
            }
        }

        pub fn by_epoch(&self) -> bool {
            match *self {
                Self::Linear { by_epoch, .. } => by_epoch,
                Self::MultiStep { by_epoch, .. } => by_epoch,
            }
        }

        pub fn name(&self) -> &'static str {
            match self {
                Self::Linear { .. } => "LinearLR",
                Self::MultiStep { .. } => "MultiStepLR",
            }
        }
    }
}

mod optim {
    use super::*;

    /// The optimizer wrapper.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct OptimWrapperConfig {
        #[serde(rename = "type")]
        pub kind: OptimWrapperKind,
        pub optimizer: OptimizerConfig,
        #[serde(default)]
        pub clip_grad: Option<ClipGrad>,
    }

    impl OptimWrapperConfig {
        pub fn validate(&self) -> Result<()> {
            self.optimizer.validate()?;
            if let Some(clip_grad) = &self.clip_grad {
                ensure!(clip_grad.max_norm > 0.0, "max_norm must be positive");
                ensure!(clip_grad.norm_type > 0.0, "norm_type must be positive");
            }
            Ok(())
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum OptimWrapperKind {
        OptimWrapper,
        /// Mixed precision training.
        AmpOptimWrapper,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(tag = "type")]
    pub enum OptimizerConfig {
        #[serde(rename = "SGD")]
        Sgd {
            lr: R64,
            #[serde(default = "zero")]
            momentum: R64,
            #[serde(default = "zero")]
            weight_decay: R64,
        },
        Adam {
            lr: R64,
            #[serde(default = "zero")]
            weight_decay: R64,
        },
    }

    impl OptimizerConfig {
        pub fn lr(&self) -> R64 {
            match *self {
                Self::Sgd { lr, .. } => lr,
                Self::Adam { lr, .. } => lr,
            }
        }

        pub fn weight_decay(&self) -> R64 {
            match *self {
                Self::Sgd { weight_decay, .. } => weight_decay,
                Self::Adam { weight_decay, .. } => weight_decay,
            }
        }

        pub fn name(&self) -> &'static str {
            match self {
                Self::Sgd { .. } => "SGD",
                Self::Adam { .. } => "Adam",
            }
        }

        pub fn validate(&self) -> Result<()> {
            ensure!(self.lr() > 0.0, "the lr must be positive");
            ensure!(
                self.weight_decay() >= 0.0,
                "weight_decay must not be negative"
            );
            if let Self::Sgd { momentum, .. } = *self {
                ensure!(
                    momentum >= 0.0 && momentum < 1.0,
                    "momentum must be in range [0, 1)"
                );
            }
            Ok(())
        }
    }

    /// Gradient norm clipping.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ClipGrad {
        pub max_norm: R64,
        #[serde(default = "default_norm_type")]
        pub norm_type: R64,
    }

    /// The linear scaling rule of the learning rate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct AutoScaleLr {
        #[serde(default)]
        pub enable: bool,
        pub base_batch_size: usize,
    }

    impl Default for AutoScaleLr {
        fn default() -> Self {
            Self {
                enable: false,
                base_batch_size: 16,
            }
        }
    }

    impl AutoScaleLr {
        pub fn validate(&self) -> Result<()> {
            ensure!(
                self.base_batch_size > 0,
                "base_batch_size must be positive"
            );
            Ok(())
        }

        pub fn scale(&self, lr: R64, batch_size: usize) -> R64 {
            if !self.enable || self.base_batch_size == 0 {
                return lr;
            }
            lr * r64(batch_size as f64) / r64(self.base_batch_size as f64)
        }
    }

    fn zero() -> R64 {
        r64(0.0)
    }

    fn default_norm_type() -> R64 {
        r64(2.0)
    }
}
