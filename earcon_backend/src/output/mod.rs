pub mod device;
pub mod mixer;
pub mod negotiation;

pub use device::{DeviceError, DeviceInfo, DeviceResult};
pub use mixer::{Mixer, MixerError, MixerResult};
pub use negotiation::{NegotiatedConfig, NegotiationError, NegotiationResult};
