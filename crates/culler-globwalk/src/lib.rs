mod empty_glob;

use std::{
    borrow::Cow,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use culler_paths::AbsoluteSystemPathBuf;
use empty_glob::InclusiveEmptyAny;
use itertools::Itertools;
use path_slash::PathExt;
use wax::{Any, Pattern};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum WalkType {
    Files,
    Folders,
    All,
}

#[derive(Debug, PartialEq)]
pub enum MatchType {
    Match,
    PotentialMatch,
    None,
    Exclude,
}

impl WalkType {
    fn should_emit(&self, is_dir: bool) -> bool {
        match self {
            WalkType::Files => !is_dir,
            WalkType::Folders => is_dir,
            WalkType::All => true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("bad pattern: {0}")]
    BadPattern(#[from] wax::BuildError),
    #[error("invalid path")]
    InvalidPath,
}

/// Performs a glob walk, yielding paths that _are_ included in the include list
/// (if it is nonempty) and _not_ included in the exclude list.
///
/// In the case of an empty include, then all files are included.
///
/// note: the rough algorithm to achieve this is as follows:
///       - prepend the slashified base_path to each include and exclude
///       - collapse the path, and calculate the new base_path, which defined as
///         the longest common prefix of all the includes
///       - traversing above the root of the base_path is not allowed
pub fn globwalk<'a>(
    base_path: &'a AbsoluteSystemPathBuf,
    include: &'a [String],
    exclude: &'a [String],
    walk_type: WalkType,
) -> Result<Vec<Result<AbsoluteSystemPathBuf, walkdir::Error>>, WalkError> {
    let (base_path_new, include_paths, exclude_paths) =
        preprocess_paths_and_globs(base_path, include, exclude)?;

    let inc_patterns = include_paths.iter().map(|g| g.as_ref());
    let include = InclusiveEmptyAny::new(inc_patterns)?;
    let ex_patterns = exclude_paths.iter().map(|g| g.as_ref());
    let exclude = wax::any(ex_patterns)?;

    // we enable following symlinks but only because without it they are ignored
    // completely (as opposed to yielded but not followed)
    let walker = walkdir::WalkDir::new(base_path_new.as_path()).follow_links(false);
    let mut iter = walker.into_iter();

    Ok(std::iter::from_fn(move || loop {
        let entry = iter.next()?;

        let (is_symlink, path) = match entry {
            Ok(entry) => (entry.path_is_symlink(), entry.into_path()),
            Err(err) => match (err.io_error(), err.path()) {
                // make sure to yield broken symlinks
                (Some(io_err), Some(path))
                    if io_err.kind() == ErrorKind::NotFound && path.is_symlink() =>
                {
                    (true, path.to_owned())
                }
                _ => return Some(Err(err)),
            },
        };

        let relative_path = path.as_path(); // TODO
        let is_directory = !path.is_symlink() && path.is_dir();

        let match_type = do_match(relative_path, &include, &exclude);

        if (match_type == MatchType::Exclude || is_symlink) && is_directory {
            iter.skip_current_dir();
        }

        match match_type {
            // if it is a perfect match, and our walk_type allows it, then we should yield it
            MatchType::Match if walk_type.should_emit(is_directory) => {
                return Some(Ok(AbsoluteSystemPathBuf::new(path).expect("absolute")));
            }
            // we should yield potential matches if they are symlinks. we don't want to traverse
            // into them, but simply say 'hey this is a symlink that could match'
            // MatchType::PotentialMatch if is_symlink && walk_type.should_emit(is_directory) => {
            // return Some(Ok(AbsoluteSystemPathBuf::new(path).expect("absolute")));
            // }
            // just skip and continue on with the loop
            MatchType::None | MatchType::PotentialMatch | MatchType::Match | MatchType::Exclude => {
            }
        }
    })
    .collect())
}

fn join_unix_like_paths(a: &str, b: &str) -> String {
    [a.trim_end_matches('/'), "/", b.trim_start_matches('/')].concat()
}

fn preprocess_paths_and_globs(
    base_path: &AbsoluteSystemPathBuf,
    include: &[String],
    exclude: &[String],
) -> Result<(PathBuf, Vec<String>, Vec<String>), WalkError> {
    let base_path_slash = base_path
        .as_path()
        .to_slash()
        .ok_or(WalkError::InvalidPath)?;
    let (include_paths, lowest_segment) = include
        .into_iter()
        .map(|s| join_unix_like_paths(&base_path_slash, s))
        .filter_map(|s| collapse_path(&s).map(|(s, v)| (s.to_string(), v)))
        .fold(
            (vec![], usize::MAX),
            |(mut vec, lowest_segment), (path, lowest_segment_next)| {
                let lowest_segment = std::cmp::min(lowest_segment, lowest_segment_next);
                vec.push(path.to_string()); // we stringify here due to lifetime issues
                (vec, lowest_segment)
            },
        );

    let base_path = base_path
        .components()
        .take(lowest_segment + 1)
        .collect::<PathBuf>();

    let exclude_paths = exclude
        .into_iter()
        .map(|s| join_unix_like_paths(&base_path_slash, s))
        .filter_map(|g| {
            let (split, _) = collapse_path(&g)?;
            let split = split.to_string();
            if split.ends_with('/') {
                Some(format!("{}**", split))
            } else {
                Some(split)
            }
        })
        .collect::<Vec<_>>();

    Ok((base_path, include_paths, exclude_paths))
}

fn do_match(path: &Path, include: &InclusiveEmptyAny, exclude: &Any) -> MatchType {
    let path_unix = match path.to_slash() {
        Some(path) => path,
        None => return MatchType::None, // you can't match a path that isn't valid unicode
    };

    let is_match = include.is_match(path_unix.as_ref());
    let is_match2 = exclude.is_match(path_unix.as_ref());
    match (is_match, is_match2) {
        (_, true) => MatchType::Exclude, // exclude takes precedence
        (true, false) => MatchType::Match,
        (false, false) => MatchType::None,
    }
}

/// collapse a path, returning a new path with all the dots and dotdots removed
///
/// also returns the position in the path of the first encountered collapse,
/// for the purposes of calculating the new base path
fn collapse_path(path: &str) -> Option<(Cow<str>, usize)> {
    let mut stack: Vec<&str> = vec![];
    let mut changed = false;
    let is_root = path.starts_with("/");

    // the index of the lowest segment that was collapsed
    // this is defined as the lowest stack size after a collapse
    let mut lowest_index = None;

    for segment in path.trim_start_matches('/').split('/') {
        match segment {
            ".." => {
                lowest_index.get_or_insert(stack.len());
                if let None = stack.pop() {
                    return None;
                }
                changed = true;
            }
            "." => {
                lowest_index.get_or_insert(stack.len());
                changed = true;
            }
            _ => stack.push(segment),
        }
        lowest_index.as_mut().map(|s| *s = stack.len().min(*s));
    }

    let lowest_index = lowest_index.unwrap_or(stack.len());
    if !changed {
        Some((Cow::Borrowed(path), lowest_index))
    } else {
        let string = if is_root {
            std::iter::once("").chain(stack.into_iter()).join("/")
        } else {
            stack.join("/")
        };

        Some((Cow::Owned(string), lowest_index))
    }
}
