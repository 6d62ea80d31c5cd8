//! Link selected by configuration
//!
//! Task entry points cannot be generic, so the two link kinds are folded
//! into one concrete type.

use lumen_core::link::{MeasurementChannel, MeasurementLink, Pacing, Publish};
use lumen_core::measurement::Measurement;
use lumen_core::scheduler::{BlockReason, Timeout};
use lumen_core::store::MeasurementStore;

use crate::Cs;

#[derive(Clone, Copy)]
pub enum SelectedLink {
    Store(&'static MeasurementStore<Cs>),
    Channel(&'static MeasurementChannel<Cs>),
}

impl MeasurementLink for SelectedLink {
    fn pacing(&self) -> Pacing {
        match self {
            Self::Store(store) => store.pacing(),
            Self::Channel(channel) => channel.pacing(),
        }
    }

    fn wait_reason(&self) -> BlockReason {
        match self {
            Self::Store(store) => store.wait_reason(),
            Self::Channel(channel) => channel.wait_reason(),
        }
    }

    async fn publish(&self, measurement: Measurement) -> Publish {
        match self {
            Self::Store(store) => store.publish(measurement).await,
            Self::Channel(channel) => channel.publish(measurement).await,
        }
    }

    async fn obtain(&self) -> Result<Measurement, Timeout> {
        match self {
            Self::Store(store) => store.obtain().await,
            Self::Channel(channel) => channel.obtain().await,
        }
    }
}
