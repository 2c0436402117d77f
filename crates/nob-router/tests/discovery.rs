//! Directory scan tests against real fixture trees.

use nob_router::{DiscoveryConfig, RouteManifest, discover, scan_routes};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "export default function X() { return null }\n").unwrap();
}

fn project(files: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for file in files {
        touch(dir.path(), file);
    }
    dir
}

fn config(dir: &TempDir) -> DiscoveryConfig {
    DiscoveryConfig::for_project(dir.path(), "app")
}

#[test]
fn blog_slug_resolves_with_blog_layout() {
    let dir = project(&[
        "app/page.tsx",
        "app/blog/page.tsx",
        "app/blog/[slug]/page.tsx",
        "app/blog/layout.tsx",
    ]);
    let table = discover(&config(&dir));

    let hit = table.match_path("/blog/hello-world").unwrap();
    assert_eq!(hit.route.pattern_str(), "/blog/[slug]");
    assert_eq!(hit.route.page_path, "/app/blog/[slug]/page.tsx");
    assert_eq!(hit.route.layout_paths, ["/app/blog/layout.tsx"]);
    assert_eq!(hit.params.len(), 1);
    assert_eq!(hit.params["slug"], "hello-world");

    let root = table.match_path("/").unwrap();
    assert_eq!(root.route.page_path, "/app/page.tsx");
    assert!(root.route.layout_paths.is_empty());
}

#[test]
fn layouts_accumulate_outermost_first() {
    let dir = project(&[
        "app/layout.tsx",
        "app/docs/layout.tsx",
        "app/docs/api/layout.jsx",
        "app/docs/api/page.tsx",
    ]);
    let table = discover(&config(&dir));

    let hit = table.match_path("/docs/api").unwrap();
    assert_eq!(
        hit.route.layout_paths,
        [
            "/app/layout.tsx",
            "/app/docs/layout.tsx",
            "/app/docs/api/layout.jsx"
        ]
    );
}

#[test]
fn boundaries_inherit_and_nearest_wins() {
    let dir = project(&[
        "app/loading.tsx",
        "app/error.tsx",
        "app/page.tsx",
        "app/shop/error.tsx",
        "app/shop/page.tsx",
        "app/shop/[id]/page.tsx",
    ]);
    let table = discover(&config(&dir));

    let root = table.match_path("/").unwrap().route;
    assert_eq!(root.loading_path.as_deref(), Some("/app/loading.tsx"));
    assert_eq!(root.error_path.as_deref(), Some("/app/error.tsx"));

    let item = table.match_path("/shop/42").unwrap().route;
    assert_eq!(item.loading_path.as_deref(), Some("/app/loading.tsx"));
    assert_eq!(item.error_path.as_deref(), Some("/app/shop/error.tsx"));
}

#[test]
fn group_directories_add_no_segment() {
    let dir = project(&[
        "app/(marketing)/layout.tsx",
        "app/(marketing)/about/page.tsx",
    ]);
    let table = discover(&config(&dir));

    let hit = table.match_path("/about").unwrap();
    assert_eq!(hit.route.page_path, "/app/(marketing)/about/page.tsx");
    assert_eq!(hit.route.layout_paths, ["/app/(marketing)/layout.tsx"]);
    assert!(table.match_path("/(marketing)/about").is_none());
}

#[test]
fn empty_group_directory_adds_no_segment() {
    let dir = project(&["app/()/contact/page.tsx"]);
    let table = discover(&config(&dir));

    let hit = table.match_path("/contact").unwrap();
    assert_eq!(hit.route.page_path, "/app/()/contact/page.tsx");
    assert!(table.match_path("/()/contact").is_none());
}

#[test]
fn extension_priority_picks_tsx() {
    let dir = project(&["app/page.js", "app/page.tsx", "app/page.ts"]);
    let table = discover(&config(&dir));

    assert_eq!(table.len(), 1);
    assert_eq!(table.routes()[0].page_path, "/app/page.tsx");
}

#[test]
fn skips_hidden_and_node_modules() {
    let dir = project(&[
        "app/page.tsx",
        "app/.cache/page.tsx",
        "app/node_modules/pkg/page.tsx",
    ]);
    let table = discover(&config(&dir));

    assert_eq!(table.len(), 1);
    assert!(table.match_path("/.cache").is_none());
}

#[test]
fn invalid_catch_all_route_is_skipped() {
    let dir = project(&["app/page.tsx", "app/[...rest]/edit/page.tsx"]);
    let table = discover(&config(&dir));

    assert_eq!(table.len(), 1);
    assert_eq!(table.routes()[0].pattern_str(), "/");
}

#[test]
fn not_found_renders_with_root_layouts() {
    let dir = project(&[
        "app/layout.tsx",
        "app/page.tsx",
        "app/not-found.tsx",
        "app/blog/layout.tsx",
        "app/blog/page.tsx",
    ]);
    let table = discover(&config(&dir));

    assert!(table.match_path("/nope").is_none());
    let boundary = table.not_found_for("/nope").unwrap();
    assert_eq!(boundary.path, "/app/not-found.tsx");
    assert_eq!(boundary.layout_paths, ["/app/layout.tsx"]);

    // Routes below carry the inherited not-found file
    let blog = table.match_path("/blog").unwrap().route;
    assert_eq!(blog.not_found_path.as_deref(), Some("/app/not-found.tsx"));
}

#[test]
fn scan_order_does_not_change_table() {
    let dir = project(&[
        "app/page.tsx",
        "app/a/page.tsx",
        "app/a/[id]/page.tsx",
        "app/a/b/page.tsx",
        "app/a/[...rest]/page.tsx",
    ]);
    let mut scanned = scan_routes(&config(&dir));
    let forward = scanned.clone().into_table();
    scanned.routes.reverse();
    let backward = scanned.into_table();

    assert_eq!(forward, backward);
    let order: Vec<&str> = forward.routes().iter().map(|r| r.pattern_str()).collect();
    assert_eq!(order, ["/a/b", "/a", "/", "/a/[id]", "/a/[...rest]"]);
}

#[test]
fn manifest_round_trip_matches_server() {
    let dir = project(&[
        "app/layout.tsx",
        "app/page.tsx",
        "app/not-found.tsx",
        "app/about/page.tsx",
        "app/blog/page.tsx",
        "app/blog/layout.tsx",
        "app/blog/[slug]/page.tsx",
        "app/blog/new/page.tsx",
        "app/docs/[...path]/page.tsx",
        "app/(shop)/cart/page.tsx",
        "app/users/[id]/posts/[post]/page.tsx",
    ]);
    let server = discover(&config(&dir));

    let json = server.to_manifest().to_json().unwrap();
    let client = RouteManifest::from_json(&json).unwrap().into_table().unwrap();

    let corpus = [
        "/",
        "/about",
        "/about/",
        "/blog",
        "/blog/new",
        "/blog/hello-world",
        "/blog/a/b",
        "/docs",
        "/docs/a",
        "/docs/a/b/c",
        "/cart",
        "/users/7/posts/9",
        "/users/7/posts",
        "/nope",
        "/blog?x=1",
    ];
    for path in corpus {
        let expected = server
            .match_path(path)
            .map(|m| (m.route.page_path.clone(), m.params));
        let actual = client
            .match_path(path)
            .map(|m| (m.route.page_path.clone(), m.params));
        assert_eq!(expected, actual, "mismatch for {path}");

        let expected = server.not_found_for(path).map(|b| b.path.clone());
        let actual = client.not_found_for(path).map(|b| b.path.clone());
        assert_eq!(expected, actual, "not-found mismatch for {path}");
    }
}
