pub mod alpha_mask;
pub mod color_sampler;
pub mod compose;
pub mod edge_sharpen;
pub mod hybrid_alpha;
pub mod inter_area;
pub mod mask_refine;
pub mod range_threshold;
pub mod rect;
pub mod region_grow;
pub mod segmenter;
pub mod transform;
pub mod trim;
