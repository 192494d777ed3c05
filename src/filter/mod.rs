mod facets;
mod pipeline;
mod selection;
mod shuffle;

pub use facets::FacetOption;
pub use facets::FacetOptions;
pub use facets::derive_facet_options;
pub use facets::is_vinyl;
pub use facets::partition_vinyl;
pub use pipeline::CollectionView;
pub use pipeline::ViewRequest;
pub use pipeline::derive_view;
pub use selection::FilterSelection;
pub use shuffle::ShuffleRng;
pub use shuffle::advance_seed;
pub use shuffle::fresh_seed;
