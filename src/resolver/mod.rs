/*!
 * Path & Pattern Resolver
 *
 * Leaf component of the authorization stack:
 * - Path variables ($APPDATA, $HOME, $TEMP, $RESOURCE) resolved once per process
 * - Canonicalization that resolves symlinks and `.`/`..` before anything is matched
 * - Segment globs where `*` stays inside one segment and `**` spans segments
 * - URL canonicalization for outbound network targets
 */

pub mod canonical;
pub mod pattern;
pub mod types;
pub mod url;
pub mod variables;

pub use canonical::{canonicalize, canonicalize_for_create, canonicalize_nearest, CanonicalPath};
pub use pattern::{glob_match, GlobPattern};
pub use types::{ResolveError, ResolveResult};
pub use url::CanonicalUrl;
pub use variables::{PathVariable, PathVariables};
