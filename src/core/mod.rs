/*!
 * Filesystem helpers shared by the resolution engine
 */

pub mod dry_run;
pub mod hardlink;
