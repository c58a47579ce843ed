// Model builders for the supported routing problems

pub mod unsplittable;
pub mod wavelength;

pub use unsplittable::{UnsplittableFlowFormulation, UnsplittableModel};
pub use wavelength::{WavelengthModel, WavelengthRoutingFormulation};
