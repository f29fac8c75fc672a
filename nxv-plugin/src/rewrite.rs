//! Trigger-target rewriting.
//!
//! Every existing target named in the trigger list gets the environment
//! setup target prepended to its `dependsOn`, so running e.g. `e2e` first
//! prepares its environment.

use nxv_core::{DependsOn, Targets};

use crate::constants::TARGET_ENVIRONMENT_SETUP;

/// Return the rewritten trigger targets. Targets not named in `trigger_names`
/// are passed through untouched. Applying the result again is a no-op: a
/// target that already depends on setup keeps its edges as they are.
pub fn update_env_target_names(existing: &Targets, trigger_names: &[String]) -> Targets {
    existing
        .iter()
        .map(|(name, target)| {
            if !trigger_names.contains(name) {
                return (name.clone(), target.clone());
            }
            let setup = DependsOn::on_self(TARGET_ENVIRONMENT_SETUP).forward();
            if target.depends_on.contains(&setup) {
                return (name.clone(), target.clone());
            }
            let mut target = target.clone();
            target.depends_on.insert(0, setup);
            (name.clone(), target)
        })
        .collect()
}
