//! Version-diff renderer.
//!
//! Surfaces every asynchronous change produced by the coordination session
//! since the last tick without losing or duplicating one, and without
//! corrupting the in-progress input line. Kinds are checked in a fixed
//! order; each changed kind gets its own erase/render/restore cycle so the
//! console is never observable in a half-updated state.

use std::{fmt::Write as _, io};

use muster_coordination::{RoomInfo, RoomList, RoomResult};

use crate::ports::{CoordinationPort, LineConsole};

/// Last-rendered version per tracked response kind. All counters start at 0,
/// matching a coordination session that has produced no responses yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeenVersions {
    /// Room membership snapshot version.
    pub room_info: u64,
    /// Create/join outcome snapshot version.
    pub room_result: u64,
    /// Room listing snapshot version.
    pub room_list: u64,
}

/// Render every snapshot whose version moved since the last call.
///
/// Comparison is strict inequality, not ordering: a kind may reset or its
/// counter may wrap after a long session, and under the increments-on-every-
/// update contract "changed" is exactly "not equal".
pub fn surface_updates<K, C>(
    coordination: &K,
    console: &mut C,
    seen: &mut SeenVersions,
) -> io::Result<()>
where
    K: CoordinationPort + ?Sized,
    C: LineConsole + ?Sized,
{
    if coordination.room_info().version() != seen.room_info {
        console.erase_displayed_line()?;
        console.print(&format_room_info(coordination.room_info().get()))?;
        console.restore_displayed_line()?;
        seen.room_info = coordination.room_info().version();
    }

    if coordination.room_result().version() != seen.room_result {
        console.erase_displayed_line()?;
        console.print(&format_room_result(coordination.room_result().get()))?;
        console.restore_displayed_line()?;
        seen.room_result = coordination.room_result().version();
    }

    if coordination.room_list().version() != seen.room_list {
        console.erase_displayed_line()?;
        console.print(&format_room_list(coordination.room_list().get()))?;
        console.restore_displayed_line()?;
        seen.room_list = coordination.room_list().version();
    }

    Ok(())
}

fn format_room_info(info: &RoomInfo) -> String {
    let mut out = String::from("--- room info updated ---\n");
    for (index, member) in info.members.iter().enumerate() {
        let marker = if index as u32 == info.owner_index { '\u{1F451}' } else { ' ' };
        let _ = writeln!(out, "{marker}\u{1F464} userID: {member:016X}");
    }
    out
}

fn format_room_result(result: &RoomResult) -> String {
    format!(
        "--- room entry ---\n\u{1F3E0} roomID: {}, connectionToRoom: {}\n",
        result.room_id, result.connection_index
    )
}

fn format_room_list(list: &RoomList) -> String {
    let mut out = format!("--- rooms ({}) ---\n", list.entries.len());
    if list.entries.is_empty() {
        out.push_str("(none)\n");
    }
    for entry in &list.entries {
        let _ = writeln!(out, "#{} '{}' members: {}", entry.room_id, entry.name, entry.member_count);
    }
    out
}
