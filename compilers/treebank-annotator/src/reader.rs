use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::{map, opt},
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult,
};
use treebank_protocol::Tree;

use crate::error::ReadError;

/// Label given to an unlabelled outermost bracket, as in `( (S ...) )`.
pub const ROOT_LABEL: &str = "ROOT";

/// Anything but whitespace and parentheses.
fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn atom(input: &str) -> IResult<&str, &str> {
    take_while1(is_atom_char)(input)
}

/// `(LABEL child*)` with the label optional.
fn bracket(input: &str) -> IResult<&str, (Option<&str>, Vec<Tree>)> {
    delimited(
        char('('),
        pair(
            opt(preceded(multispace0, atom)),
            many0(preceded(multispace0, child)),
        ),
        preceded(multispace0, char(')')),
    )(input)
}

fn child(input: &str) -> IResult<&str, Tree> {
    alt((
        map(bracket, |(label, children)| {
            Tree::node(label.unwrap_or_default(), children)
        }),
        map(atom, Tree::leaf),
    ))(input)
}

fn top(input: &str) -> IResult<&str, Tree> {
    map(bracket, |(label, children)| {
        Tree::node(label.unwrap_or(ROOT_LABEL), children)
    })(input)
}

fn offset_of(whole: &str, rest: &str) -> usize {
    whole.len() - rest.len()
}

fn malformed(whole: &str, err: nom::Err<nom::error::Error<&str>>) -> ReadError {
    match err {
        nom::Err::Error(e) | nom::Err::Failure(e) => ReadError::Malformed {
            offset: offset_of(whole, e.input),
        },
        nom::Err::Incomplete(_) => ReadError::Malformed { offset: whole.len() },
    }
}

/// Reads exactly one tree in Penn bracket notation.
pub fn read_tree(input: &str) -> Result<Tree, ReadError> {
    let start = input.trim_start();
    if start.is_empty() {
        return Err(ReadError::Empty);
    }
    let (rest, tree) = top(start).map_err(|e| malformed(input, e))?;
    let rest = rest.trim_start();
    if !rest.is_empty() {
        return Err(ReadError::Trailing {
            offset: offset_of(input, rest),
        });
    }
    Ok(tree)
}

/// Reads every tree in `input`, in order. Whitespace between trees is free.
pub fn read_trees(input: &str) -> Result<Vec<Tree>, ReadError> {
    let mut rest = input;
    let mut trees = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let (next, tree) = top(rest).map_err(|e| malformed(input, e))?;
        trees.push(tree);
        rest = next;
    }
    Ok(trees)
}
