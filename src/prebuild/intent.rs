//! Build intent tracking
//!
//! The host announces every command before it runs as a (command set GUID,
//! command id) pair. Commands from either of the two standard command sets
//! are matched against the build command ids and set the pending
//! [`BuildAction`]; the id decides, not which standard set it arrived in.
//! Everything else is ignored. Unmapped commands keep the current action
//! because unrelated commands routinely fire between the build command and
//! the build start.

use super::action::BuildAction;
use serde::Serialize;
use tracing::trace;
use uuid::Uuid;

/// Standard command set shipped with the 97 shell.
pub const STD97_COMMAND_SET: Uuid = Uuid::from_u128(0x5EFC7975_14BC_11CF_9B2B_00AA00573819);

/// Standard command set added with the 2000 shell.
pub const STD2K_COMMAND_SET: Uuid = Uuid::from_u128(0x1496A755_94DE_11D0_8C3F_00C04FC2AAE2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CommandSet {
    Std97,
    Std2K,
}

impl CommandSet {
    /// Recognizes a command set GUID in braced or bare form, any case.
    pub fn from_guid(guid: &str) -> Option<Self> {
        let parsed = Uuid::parse_str(guid.trim()).ok()?;
        if parsed == STD97_COMMAND_SET {
            Some(CommandSet::Std97)
        } else if parsed == STD2K_COMMAND_SET {
            Some(CommandSet::Std2K)
        } else {
            None
        }
    }

    pub fn guid(self) -> Uuid {
        match self {
            CommandSet::Std97 => STD97_COMMAND_SET,
            CommandSet::Std2K => STD2K_COMMAND_SET,
        }
    }
}

/// A build command; `set` is the standard set that defines it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildCommand {
    pub set: CommandSet,
    pub id: i32,
    pub name: &'static str,
    pub action: BuildAction,
}

const fn cmd(set: CommandSet, id: i32, name: &'static str, action: BuildAction) -> BuildCommand {
    BuildCommand {
        set,
        id,
        name,
        action,
    }
}

/// Every command that sets a build action.
pub const BUILD_COMMANDS: &[BuildCommand] = &[
    cmd(CommandSet::Std97, 882, "BuildSln", BuildAction::Build),
    cmd(CommandSet::Std97, 887, "BuildSel", BuildAction::Build),
    cmd(CommandSet::Std97, 990, "BuildCtx", BuildAction::Build),
    cmd(CommandSet::Std2K, 1603, "BuildOnlyProject", BuildAction::Build),
    cmd(CommandSet::Std97, 883, "RebuildSln", BuildAction::Rebuild),
    cmd(CommandSet::Std97, 888, "RebuildSel", BuildAction::Rebuild),
    cmd(CommandSet::Std97, 991, "RebuildCtx", BuildAction::Rebuild),
    cmd(CommandSet::Std2K, 1604, "RebuildOnlyProject", BuildAction::Rebuild),
    cmd(CommandSet::Std97, 885, "CleanSln", BuildAction::Clean),
    cmd(CommandSet::Std97, 889, "CleanSel", BuildAction::Clean),
    cmd(CommandSet::Std97, 992, "CleanCtx", BuildAction::Clean),
    cmd(CommandSet::Std2K, 1605, "CleanOnlyProject", BuildAction::Clean),
    cmd(CommandSet::Std97, 886, "DeploySln", BuildAction::Deploy),
    cmd(CommandSet::Std97, 890, "DeploySel", BuildAction::Deploy),
    cmd(CommandSet::Std97, 993, "DeployCtx", BuildAction::Deploy),
];

/// Finds a build command by id. Ids are unique across both standard sets.
pub fn lookup(id: i32) -> Option<&'static BuildCommand> {
    BUILD_COMMANDS.iter().find(|c| c.id == id)
}

#[derive(Debug, Default, Clone)]
pub struct IntentTracker {
    current: BuildAction,
}

impl IntentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observes a command about to execute. The command always runs.
    pub fn observe(&mut self, command_set: &str, command_id: i32) {
        let Some(set) = CommandSet::from_guid(command_set) else {
            return;
        };

        if let Some(command) = lookup(command_id) {
            trace!(?set, command = command.name, action = %command.action, "Build command observed");
            self.current = command.action;
        }
    }

    pub fn current_action(&self) -> BuildAction {
        self.current
    }

    pub fn reset(&mut self) {
        self.current = BuildAction::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    const STD97: &str = "{5EFC7975-14BC-11CF-9B2B-00AA00573819}";
    const STD2K: &str = "{1496A755-94DE-11D0-8C3F-00C04FC2AAE2}";

    #[parameterized(
        build_sln = { STD97, 882, BuildAction::Build },
        build_sel = { STD97, 887, BuildAction::Build },
        build_ctx = { STD97, 990, BuildAction::Build },
        build_only_project = { STD2K, 1603, BuildAction::Build },
        rebuild_sln = { STD97, 883, BuildAction::Rebuild },
        rebuild_sel = { STD97, 888, BuildAction::Rebuild },
        rebuild_ctx = { STD97, 991, BuildAction::Rebuild },
        rebuild_only_project = { STD2K, 1604, BuildAction::Rebuild },
        clean_sln = { STD97, 885, BuildAction::Clean },
        clean_sel = { STD97, 889, BuildAction::Clean },
        clean_ctx = { STD97, 992, BuildAction::Clean },
        clean_only_project = { STD2K, 1605, BuildAction::Clean },
        deploy_sln = { STD97, 886, BuildAction::Deploy },
        deploy_sel = { STD97, 890, BuildAction::Deploy },
        deploy_ctx = { STD97, 993, BuildAction::Deploy },
    )]
    fn test_recognized_command_sets_action(guid: &str, id: i32, expected: BuildAction) {
        let mut tracker = IntentTracker::new();
        tracker.observe(guid, id);

        assert_eq!(tracker.current_action(), expected);
    }

    #[parameterized(
        std97_id_from_std2k = { STD2K, 882, BuildAction::Build },
        std97_clean_from_std2k = { STD2K, 992, BuildAction::Clean },
        std2k_id_from_std97 = { STD97, 1603, BuildAction::Build },
        std2k_rebuild_from_std97 = { STD97, 1604, BuildAction::Rebuild },
    )]
    fn test_ids_match_in_either_standard_set(guid: &str, id: i32, expected: BuildAction) {
        let mut tracker = IntentTracker::new();
        tracker.observe(guid, id);

        assert_eq!(tracker.current_action(), expected);
    }

    #[parameterized(
        unmapped_std97_id = { STD97, 220 },
        unmapped_std2k_id = { STD2K, 1606 },
        foreign_set = { "{00000000-0000-0000-0000-000000000001}", 882 },
        not_a_guid = { "build", 882 },
        empty_guid = { "", 883 },
    )]
    fn test_unrecognized_command_keeps_action(guid: &str, id: i32) {
        let mut tracker = IntentTracker::new();
        tracker.observe(STD97, 883);

        tracker.observe(guid, id);
        assert_eq!(tracker.current_action(), BuildAction::Rebuild);
    }

    #[test]
    fn test_guid_matching_ignores_case_and_braces() {
        assert_eq!(
            CommandSet::from_guid("5efc7975-14bc-11cf-9b2b-00aa00573819"),
            Some(CommandSet::Std97)
        );
        assert_eq!(
            CommandSet::from_guid(" {1496a755-94de-11d0-8c3f-00c04fc2aae2} "),
            Some(CommandSet::Std2K)
        );
        assert_eq!(CommandSet::Std2K.guid(), STD2K_COMMAND_SET);
    }

    #[test]
    fn test_later_command_wins() {
        let mut tracker = IntentTracker::new();
        tracker.observe(STD97, 882);
        tracker.observe(STD97, 885);
        assert_eq!(tracker.current_action(), BuildAction::Clean);
    }

    #[test]
    fn test_reset() {
        let mut tracker = IntentTracker::new();
        tracker.observe(STD2K, 1603);
        tracker.reset();
        assert_eq!(tracker.current_action(), BuildAction::None);
    }

    #[test]
    fn test_table_has_no_duplicate_ids() {
        for (i, a) in BUILD_COMMANDS.iter().enumerate() {
            for b in &BUILD_COMMANDS[i + 1..] {
                assert!(
                    a.id != b.id,
                    "{} and {} share an id",
                    a.name,
                    b.name
                );
            }
        }
    }
}
