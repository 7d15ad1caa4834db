//! Fixed-width listing of tracked files

use cmdata_core::TrackedFile;

fn row(name: &str, service: &str, size: &str, url: &str) -> String {
    format!("{name:<35} {service:<10} {size:<10} {url}")
        .trim_end()
        .to_string()
}

/// Render the `FILE SERVICE SIZE URL` table, header first
pub fn render_table(files: &[TrackedFile]) -> String {
    let mut lines = Vec::with_capacity(files.len() + 1);
    lines.push(row("FILE", "SERVICE", "SIZE", "URL"));
    for f in files {
        lines.push(row(&f.name, &f.service, &f.size.to_string(), &f.url));
    }
    lines.join("\n")
}
