use crate::api::{BuildOptions, GraphBuild, build_graph};
use crate::cli::BuildArgs;
use crate::fs::{FileSystem, default_fs};
use crate::style;

use super::CommandContext;

pub fn cmd_build(args: BuildArgs) -> i32 {
    cmd_build_with_fs(args, default_fs())
}

pub fn cmd_build_with_fs(args: BuildArgs, fs: &dyn FileSystem) -> i32 {
    let ctx = match CommandContext::new(&args.path) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let options = BuildOptions {
        report: (&args.source).into(),
        config: Some(ctx.config),
    };
    let build = match build_graph(&ctx.path, &options) {
        Ok(build) => build,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    let json = if args.compact {
        serde_json::to_string(&build.graph)
    } else {
        serde_json::to_string_pretty(&build.graph)
    };
    let json = match json {
        Ok(json) => json,
        Err(e) => {
            style::error(&format!("Failed to serialize graph: {}", e));
            return 1;
        }
    };

    match &args.output {
        Some(output_path) => {
            if let Err(e) = fs.write(output_path, &json) {
                style::error(&format!("Could not write output file: {}", e));
                return 1;
            }
            style::success(&format!("Graph written to {}", style::path(output_path)));
        }
        None => println!("{}", json),
    }

    print_summary(&build);
    0
}

fn print_summary(build: &GraphBuild) {
    let graph = &build.graph;
    eprintln!("{}", style::metric("source", build.origin));
    eprintln!("{}", style::metric("folders", graph.folders().count()));
    eprintln!("{}", style::metric("files", graph.files().count()));
    eprintln!("{}", style::metric("file edges", graph.direct_edges().count()));
    eprintln!("{}", style::metric("folder edges", graph.derived_edges().count()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFs;
    use crate::model::Graph;

    #[test]
    fn test_build_writes_graph_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/index.js"), "require('./util');\n").unwrap();
        std::fs::write(dir.path().join("src/util.js"), "").unwrap();

        let fs = MockFs::new();
        let args = BuildArgs {
            path: dir.path().to_path_buf(),
            output: Some("/out/graph.json".into()),
            ..BuildArgs::default()
        };

        assert_eq!(cmd_build_with_fs(args, &fs), 0);
        let graph: Graph = serde_json::from_str(&fs.get("/out/graph.json").unwrap()).unwrap();
        assert_eq!(graph.files().count(), 2);
        assert_eq!(graph.direct_edges().count(), 1);
    }

    #[test]
    fn test_build_missing_path_fails() {
        let args = BuildArgs {
            path: "/nonexistent/repograph/input".into(),
            ..BuildArgs::default()
        };
        assert_eq!(cmd_build_with_fs(args, &MockFs::new()), 1);
    }
}
