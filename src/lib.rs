pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod fs;
pub mod graph;
pub mod model;
pub mod paths;
pub mod report;
pub mod scan;
pub mod style;

pub use api::{BuildOptions, GraphBuild, RepographError, ReportInput, assemble, build_graph};
pub use cli::Cli;
pub use commands::{cmd_build, cmd_init, cmd_serve};
pub use config::Config;
pub use model::{FileNode, FolderNode, Graph, GraphEdge, GraphNode, GraphOrigin, Position, Size};
