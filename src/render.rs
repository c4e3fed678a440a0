//! Plain-text listings
//!
//! One line per message, using the message's `Display` form. Tree listings
//! indent each message by its depth; any other formatting is left to the
//! caller.

use std::fmt::Display;
use std::io;

use crate::message::ThreadableMessage;
use crate::ordered_list::OrderedMessageList;
use crate::threading::ThreadTree;

pub fn write_list<M, W>(list: &OrderedMessageList<'_, M>, out: &mut W) -> io::Result<()>
where
    M: ThreadableMessage + Display,
    W: io::Write,
{
    for message in list.start_scan() {
        writeln!(out, "{}", message)?;
    }
    Ok(())
}

pub fn write_tree<M, W>(tree: &ThreadTree<'_, M>, out: &mut W, indent_width: usize) -> io::Result<()>
where
    M: ThreadableMessage + Display,
    W: io::Write,
{
    let mut result = Ok(());
    tree.traverse(|depth, message| {
        if result.is_ok() {
            result = writeln!(out, "{:indent$}{}", "", message, indent = depth * indent_width);
        }
    });
    result
}
