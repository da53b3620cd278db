//! Predefined training schedules.

use crate::{common::*, config::*};

/// Names of the predefined schedules in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePreset {
    #[serde(rename = "schedule_20e")]
    Schedule20e,
    #[serde(rename = "cascade_rcnn_20e_blenderproc")]
    CascadeRcnn20eBlenderproc,
}

impl SchedulePreset {
    pub fn build(&self) -> ScheduleConfig {
        match self {
            Self::Schedule20e => schedule_20e(),
            Self::CascadeRcnn20eBlenderproc => cascade_rcnn_20e_blenderproc(),
        }
    }
}

/// Adam with a slow linear warm-up, validating every 8 epochs.
pub fn schedule_20e() -> ScheduleConfig {
    let max_epochs = 1000;

    ScheduleConfig {
        train_cfg: TrainLoopConfig::EpochBasedTrainLoop {
            max_epochs,
            val_interval: 8,
            val_begin: 1,
        },
        val_cfg: Some(ValLoopConfig::ValLoop),
        test_cfg: Some(TestLoopConfig::TestLoop),
        param_scheduler: vec![
            ParamScheduler::Linear {
                start_factor: r64(0.001),
                by_epoch: false,
                begin: 0,
                end: 1000,
            },
            ParamScheduler::MultiStep {
                by_epoch: true,
                begin: 0,
                end: max_epochs,
                milestones: vec![max_epochs],
                gamma: r64(0.1),
            },
        ],
        optim_wrapper: OptimWrapperConfig {
            kind: OptimWrapperKind::OptimWrapper,
            optimizer: OptimizerConfig::Adam {
                lr: r64(0.00005),
                weight_decay: r64(0.0001),
            },
            clip_grad: None,
        },
        auto_scale_lr: AutoScaleLr {
            enable: false,
            base_batch_size: 16,
        },
    }
}

/// Mixed precision SGD for Cascade R-CNN on rendered furniture scenes.
pub fn cascade_rcnn_20e_blenderproc() -> ScheduleConfig {
    ScheduleConfig {
        train_cfg: TrainLoopConfig::EpochBasedTrainLoop {
            max_epochs: 100,
            val_interval: 1,
            val_begin: 1,
        },
        val_cfg: Some(ValLoopConfig::ValLoop),
        test_cfg: Some(TestLoopConfig::TestLoop),
        param_scheduler: vec![
            ParamScheduler::Linear {
                start_factor: r64(0.001),
                by_epoch: false,
                begin: 0,
                end: 2000,
            },
            ParamScheduler::MultiStep {
                by_epoch: true,
                begin: 0,
                end: 12,
                milestones: vec![8, 11],
                gamma: r64(0.1),
            },
        ],
        optim_wrapper: OptimWrapperConfig {
            kind: OptimWrapperKind::AmpOptimWrapper,
            optimizer: OptimizerConfig::Sgd {
                lr: r64(0.005),
                momentum: r64(0.9),
                weight_decay: r64(0.0001),
            },
            clip_grad: Some(ClipGrad {
                max_norm: r64(35.0),
                norm_type: r64(2.0),
            }),
        },
        auto_scale_lr: AutoScaleLr {
            enable: false,
            base_batch_size: 16,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoo_schedules_are_valid() {
        schedule_20e().validate().unwrap();
        cascade_rcnn_20e_blenderproc().validate().unwrap();
    }

    #[test]
    fn preset_names() {
        let preset: SchedulePreset = json5::from_str("'cascade_rcnn_20e_blenderproc'").unwrap();
        assert_eq!(preset, SchedulePreset::CascadeRcnn20eBlenderproc);
        assert_eq!(preset.build(), cascade_rcnn_20e_blenderproc());
    }

    #[test]
    fn zoo_validation_epochs() {
        let epochs = schedule_20e().validation_epochs();
        assert_eq!(epochs.len(), 125);
        assert_eq!(epochs[0], 8);
        assert_eq!(epochs.last(), Some(&1000));

        let epochs = cascade_rcnn_20e_blenderproc().validation_epochs();
        assert_eq!(epochs, (1..=100).collect::<Vec<_>>());
    }
}
