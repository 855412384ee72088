use crate::api::{BuildOptions, build_graph};
use crate::cli::ServeArgs;
use crate::graph::AppState;
use crate::style;
use axum::http::HeaderValue;
use std::time::Duration;

use super::CommandContext;

pub fn cmd_serve(args: ServeArgs) -> i32 {
    let ctx = match CommandContext::new(&args.path) {
        Ok(ctx) => ctx,
        Err(code) => return code,
    };

    let mut analyze_origins = Vec::with_capacity(args.allow_origins.len());
    for origin in &args.allow_origins {
        match HeaderValue::from_str(origin) {
            Ok(value) => analyze_origins.push(value),
            Err(_) => {
                style::error(&format!("Invalid origin: {}", origin));
                return 1;
            }
        }
    }

    let options = BuildOptions {
        report: (&args.source).into(),
        config: Some(ctx.config.clone()),
    };
    let build = match build_graph(&ctx.path, &options) {
        Ok(build) => build,
        Err(e) => {
            style::error(&e.to_string());
            return 1;
        }
    };

    style::status(&format!(
        "Built {} nodes and {} edges from {}",
        build.graph.nodes.len(),
        build.graph.edges.len(),
        build.origin
    ));

    let state = AppState {
        build,
        config: ctx.config,
        timeout: Duration::from_secs(args.timeout),
        analyze_origins,
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            style::error(&format!("Failed to start runtime: {}", e));
            return 1;
        }
    };

    let url = format!("http://127.0.0.1:{}/api/graph", args.port);
    style::status(&format!("Serving graph at {}", style::url(&url)));
    style::status("Press Ctrl+C to stop");

    if let Err(e) = rt.block_on(crate::graph::serve(state, args.port)) {
        style::error(&format!("Server failed: {}", e));
        return 1;
    }

    0
}
