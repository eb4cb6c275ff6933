

use super::hierarchy::{HierarchyError, Taxonomy};


/// First node of `path1` that also lies on `path2`, with its position in
/// `path1`.
pub fn least_common_subsumer_in<'a>(path1: &[&'a str], path2: &[&str]) -> Option<(usize, &'a str)> {
    for (i, x) in path1.iter().enumerate() {
        for y in path2 {
            if x == y {
                return Some((i, *x));
            }
        }
    }
    None
}


/// Wu-Palmer over two precomputed first-parent paths. The depth of the
/// subsumer is the length of the remainder of `path1` starting at it.
pub fn wu_palmer_paths(path1: &[&str], path2: &[&str]) -> Option<f64> {
    let (position, _) = least_common_subsumer_in(path1, path2)?;
    let lcs_depth = (path1.len() - position) as f64;
    Some(2.0 * lcs_depth / (path1.len() + path2.len()) as f64)
}


impl Taxonomy {
    pub fn least_common_subsumer<'a>(&'a self, first: &'a str, second: &'a str) -> Option<&'a str> {
        let path1 = self.parent_path(first);
        let path2 = self.parent_path(second);
        least_common_subsumer_in(&path1, &path2).map(|(_, lcs)| lcs)
    }

    pub fn wu_palmer(&self, first: &str, second: &str) -> Result<f64, HierarchyError> {
        for uri in [first, second] {
            if !self.contains(uri) {
                return Err(HierarchyError::NotFound(uri.to_string()));
            }
        }
        if first == second {
            return Ok(1.0);
        }

        let path1 = self.parent_path(first);
        let path2 = self.parent_path(second);
        wu_palmer_paths(&path1, &path2).ok_or_else(|| HierarchyError::Disconnected {
            first: first.to_string(),
            second: second.to_string(),
        })
    }
}
