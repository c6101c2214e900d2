//! Comment trees as returned by the thread and `morechildren` endpoints.
//!
//! A thread arrives as nested `t1` things with `more` placeholders standing in
//! for collapsed branches. [`CommentForest`] keeps that shape so placeholders
//! can be replaced in place once they are resolved, and flattens the result
//! breadth-first.

use serde::Deserialize;
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, Deserialize)]
pub struct CommentListing {
    pub data: CommentListingData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentListingData {
    #[serde(default)]
    pub children: Vec<CommentThing>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum CommentThing {
    #[serde(rename = "t1")]
    Comment(CommentData),
    #[serde(rename = "more")]
    More(MoreData),
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentData {
    pub id: String,
    pub name: String,
    pub parent_id: String,
    #[serde(default)]
    pub body: String,
    /// `""` when there are no replies, otherwise a nested listing.
    #[serde(default)]
    pub replies: Option<CommentReplies>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CommentReplies {
    Listing(CommentListing),
    Empty(serde::de::IgnoredAny),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoreData {
    pub id: String,
    pub parent_id: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub children: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommentNode {
    Comment(Comment),
    More(MoreComments),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    /// Fullname, `t1_<id>`.
    pub name: String,
    pub parent_id: String,
    pub body: String,
    pub replies: Vec<CommentNode>,
}

/// A "load more comments" placeholder.
#[derive(Debug, Clone, PartialEq)]
pub struct MoreComments {
    pub id: String,
    pub parent_id: String,
    pub count: u64,
    pub children: Vec<String>,
}

impl MoreComments {
    /// "Continue this thread" links carry no child ids and must be fetched
    /// through the parent comment's own thread.
    pub fn is_continue_thread(&self) -> bool {
        self.children.is_empty()
    }

    /// Continue-thread placeholders all share the id `_`, so the parent is
    /// part of the key.
    pub fn key(&self) -> String {
        format!("{}/{}", self.parent_id, self.id)
    }

    /// Parent comment id without its `t1_` prefix.
    pub fn parent_comment_id(&self) -> Option<&str> {
        self.parent_id.strip_prefix("t1_")
    }
}

impl CommentNode {
    pub fn parent_id(&self) -> &str {
        match self {
            CommentNode::Comment(comment) => &comment.parent_id,
            CommentNode::More(more) => &more.parent_id,
        }
    }
}

impl From<CommentThing> for CommentNode {
    fn from(thing: CommentThing) -> Self {
        match thing {
            CommentThing::Comment(data) => {
                let replies = match data.replies {
                    Some(CommentReplies::Listing(listing)) => listing.into_nodes(),
                    _ => Vec::new(),
                };
                CommentNode::Comment(Comment {
                    id: data.id,
                    name: data.name,
                    parent_id: data.parent_id,
                    body: data.body,
                    replies,
                })
            }
            CommentThing::More(data) => CommentNode::More(MoreComments {
                id: data.id,
                parent_id: data.parent_id,
                count: data.count,
                children: data.children,
            }),
        }
    }
}

impl CommentListing {
    pub fn into_nodes(self) -> Vec<CommentNode> {
        self.data
            .children
            .into_iter()
            .map(CommentNode::from)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentForest {
    /// Fullname of the post, `t3_<id>`.
    pub link_id: String,
    pub roots: Vec<CommentNode>,
}

impl CommentForest {
    pub fn new(post_id: &str, roots: Vec<CommentNode>) -> Self {
        Self {
            link_id: format!("t3_{}", post_id),
            roots,
        }
    }

    pub fn from_listing(post_id: &str, listing: CommentListing) -> Self {
        Self::new(post_id, listing.into_nodes())
    }

    pub fn post_id(&self) -> &str {
        self.link_id.strip_prefix("t3_").unwrap_or(&self.link_id)
    }

    /// First placeholder in breadth-first order.
    pub fn first_more(&self) -> Option<&MoreComments> {
        self.breadth_first().find_map(|node| match node {
            CommentNode::More(more) => Some(more),
            CommentNode::Comment(_) => None,
        })
    }

    pub fn has_more(&self) -> bool {
        self.first_more().is_some()
    }

    /// Splices `replacement` where the placeholder with `key` sits. Returns
    /// false when no such placeholder exists.
    pub fn replace_more(&mut self, key: &str, replacement: Vec<CommentNode>) -> bool {
        let mut replacement = Some(replacement);
        replace_in(&mut self.roots, key, &mut replacement)
    }

    /// Comment bodies in breadth-first order: roots first, then each level of
    /// replies. Placeholders are skipped.
    pub fn bodies(&self) -> Vec<&str> {
        self.breadth_first()
            .filter_map(|node| match node {
                CommentNode::Comment(comment) => Some(comment.body.as_str()),
                CommentNode::More(_) => None,
            })
            .collect()
    }

    pub fn comment_count(&self) -> usize {
        self.bodies().len()
    }

    fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst {
            queue: self.roots.iter().collect(),
        }
    }
}

struct BreadthFirst<'a> {
    queue: VecDeque<&'a CommentNode>,
}

impl<'a> Iterator for BreadthFirst<'a> {
    type Item = &'a CommentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        if let CommentNode::Comment(comment) = node {
            self.queue.extend(comment.replies.iter());
        }
        Some(node)
    }
}

fn replace_in(
    nodes: &mut Vec<CommentNode>,
    key: &str,
    replacement: &mut Option<Vec<CommentNode>>,
) -> bool {
    let position = nodes
        .iter()
        .position(|node| matches!(node, CommentNode::More(more) if more.key() == key));

    if let Some(index) = position {
        let replacement = replacement.take().unwrap_or_default();
        nodes.splice(index..=index, replacement);
        return true;
    }

    for node in nodes.iter_mut() {
        if let CommentNode::Comment(comment) = node {
            if replace_in(&mut comment.replies, key, replacement) {
                return true;
            }
        }
    }
    false
}

/// Rebuilds a subtree from the flat list `/api/morechildren` returns.
///
/// Nodes whose parent is `parent_id` become the top level; every other node is
/// attached under the comment whose fullname matches its `parent_id`. Nodes
/// whose parent is not in the batch are appended at the top level so no
/// comment is lost.
pub fn assemble_subtree(flat: Vec<CommentNode>, parent_id: &str) -> Vec<CommentNode> {
    let mut order: Vec<String> = Vec::new();
    let mut by_parent: HashMap<String, Vec<CommentNode>> = HashMap::new();
    for node in flat {
        let parent = node.parent_id().to_string();
        if !by_parent.contains_key(&parent) {
            order.push(parent.clone());
        }
        by_parent.entry(parent).or_default().push(node);
    }

    let mut nodes = attach_children(&mut by_parent, parent_id);
    for parent in order {
        if by_parent.contains_key(&parent) {
            nodes.extend(attach_children(&mut by_parent, &parent));
        }
    }
    nodes
}

fn attach_children(
    by_parent: &mut HashMap<String, Vec<CommentNode>>,
    parent_id: &str,
) -> Vec<CommentNode> {
    let mut nodes = by_parent.remove(parent_id).unwrap_or_default();
    for node in nodes.iter_mut() {
        if let CommentNode::Comment(comment) = node {
            let children = attach_children(by_parent, &comment.name);
            comment.replies.extend(children);
        }
    }
    nodes
}
