//! Splits a batch into contiguous work groups, one per available core.

use super::command::CommandTemplate;

/// One external solver invocation: a contiguous run of input images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkGroup {
    index: usize,
    program: String,
    images: Vec<String>,
    args: Vec<String>,
}

impl WorkGroup {
    /// Position of the group in partition order
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Full argument list: template tokens followed by this group's images
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Sizes of `parts` near-equal contiguous sections of `len` items.
///
/// The first `len % parts` sections get one extra item, so later sections are
/// never larger than earlier ones. Sections of size zero are omitted.
pub fn section_sizes(len: usize, parts: usize) -> Vec<usize> {
    let parts = parts.max(1);
    let base = len / parts;
    let extra = len % parts;
    (0..parts)
        .map(|i| base + usize::from(i < extra))
        .filter(|&size| size > 0)
        .collect()
}

/// Splits `images` into at most `parallelism` groups, preserving input order.
///
/// Produces exactly `min(parallelism, images.len())` non-empty groups.
pub fn partition(template: &CommandTemplate, images: &[String], parallelism: usize) -> Vec<WorkGroup> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (index, size) in section_sizes(images.len(), parallelism).into_iter().enumerate() {
        let chunk = &images[start..start + size];
        start += size;
        groups.push(WorkGroup {
            index,
            program: template.program().to_string(),
            images: chunk.to_vec(),
            args: template.with_images(chunk),
        });
    }
    groups
}
