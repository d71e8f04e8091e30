//! Per-node copy context: depth, location, and containing property.
//!
//! Contexts live on the stack. A child context borrows its parent, so the
//! path is a linked list of segments that is only rendered to a string when a
//! warning or error needs it.

use std::fmt;

use crate::composite::Property;

/// Location of a node in the graph being copied.
///
/// Renders as `root`, `root.prop`, `root.prop[3]` or `root.prop["key"]`.
/// Only used for diagnostics and error messages.
#[derive(Clone, Copy)]
pub struct Path<'a> {
    parent: Option<&'a Path<'a>>,
    segment: Segment<'a>,
}

#[derive(Clone, Copy)]
enum Segment<'a> {
    Root,
    Property(&'a str),
    Index(usize),
    Key(&'a dyn fmt::Debug),
}

impl<'a> Path<'a> {
    const ROOT: Path<'static> = Path {
        parent: None,
        segment: Segment::Root,
    };

    /// Returns the name of the last segment (`root`, `prop`, `[3]`, `["key"]`).
    pub fn member(&self) -> String {
        match self.segment {
            Segment::Root => "root".to_string(),
            Segment::Property(name) => name.to_string(),
            Segment::Index(index) => format!("[{index}]"),
            Segment::Key(key) => format!("[{key:?}]"),
        }
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    fn child(&'a self, segment: Segment<'a>) -> Self {
        Self {
            parent: Some(self),
            segment,
        }
    }
}

impl fmt::Display for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = self.parent {
            fmt::Display::fmt(parent, f)?;
        }
        match self.segment {
            Segment::Root => f.write_str("root"),
            Segment::Property(name) => write!(f, ".{name}"),
            Segment::Index(index) => write!(f, "[{index}]"),
            Segment::Key(key) => write!(f, "[{key:?}]"),
        }
    }
}

impl fmt::Debug for Path<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

/// A shared allocation on the current ancestor chain.
///
/// Used by the optional cycle detector; pointers are only compared, never
/// dereferenced.
#[derive(Clone, Copy)]
pub(crate) struct Frame<'a> {
    pub(crate) ptr: *const (),
    pub(crate) parent: Option<&'a Frame<'a>>,
}

/// State threaded through every recursive copy call.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    depth: usize,
    path: Path<'a>,
    property: Option<&'a Property>,
    frames: Option<&'a Frame<'a>>,
}

impl<'a> Context<'a> {
    /// Context for the root value: depth 0, path `root`, no property.
    pub fn root() -> Context<'static> {
        Context {
            depth: 0,
            path: Path::ROOT,
            property: None,
            frames: None,
        }
    }

    /// Nesting depth of the current node.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Location of the current node.
    pub fn path(&self) -> &Path<'a> {
        &self.path
    }

    /// Metadata of the property that contains the current node, if any.
    ///
    /// `None` only for the root and for elements of a root-level collection.
    pub fn property(&self) -> Option<&'a Property> {
        self.property
    }

    /// Context for the value of `property`.
    pub fn enter_property<'b>(&'b self, property: &'b Property) -> Context<'b> {
        Context {
            depth: self.depth + 1,
            path: self.path.child(Segment::Property(property.name)),
            property: Some(property),
            frames: self.frames,
        }
    }

    /// Context for the element at `index` of the current collection.
    pub fn enter_index(&self, index: usize) -> Context<'_> {
        Context {
            depth: self.depth + 1,
            path: self.path.child(Segment::Index(index)),
            property: self.property,
            frames: self.frames,
        }
    }

    /// Context for the value stored under `key` in the current map.
    pub fn enter_key<'b>(&'b self, key: &'b dyn fmt::Debug) -> Context<'b> {
        Context {
            depth: self.depth + 1,
            path: self.path.child(Segment::Key(key)),
            property: self.property,
            frames: self.frames,
        }
    }

    pub(crate) fn frames(&self) -> Option<&'a Frame<'a>> {
        self.frames
    }

    /// Returns `true` if `ptr` is already on the ancestor chain.
    pub(crate) fn visits(&self, ptr: *const ()) -> bool {
        let mut frame = self.frames;
        while let Some(current) = frame {
            if std::ptr::eq(current.ptr, ptr) {
                return true;
            }
            frame = current.parent;
        }
        false
    }

    /// Same node, with `frame` pushed onto the ancestor chain.
    pub(crate) fn with_frame<'b>(&'b self, frame: &'b Frame<'b>) -> Context<'b> {
        Context {
            depth: self.depth,
            path: self.path,
            property: self.property,
            frames: Some(frame),
        }
    }
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("depth", &self.depth)
            .field("path", &format_args!("{}", self.path))
            .field("property", &self.property.map(|property| property.name))
            .finish_non_exhaustive()
    }
}
