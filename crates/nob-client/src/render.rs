//! Render-tree composition.
//!
//! The tree is built inside-out by an explicit fold:
//!
//! ```text
//! Layout(outermost)
//!   └─ Layout(…)
//!       └─ ErrorBoundary(error)      if the route has one
//!           └─ Suspense(loading)     if the route has one
//!               └─ Page(params)
//! ```

use nob_router::Params;

/// A node in the composed tree. `M` is the host's module handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode<M> {
    /// The page module
    Page { module: M, params: Params },
    /// Loading placeholder shown while the child suspends
    Suspense { fallback: M, child: Box<RenderNode<M>> },
    /// Catches render errors from the child
    ErrorBoundary {
        fallback: M,
        params: Params,
        child: Box<RenderNode<M>>,
    },
    /// A wrapper module
    Layout {
        module: M,
        params: Params,
        child: Box<RenderNode<M>>,
    },
    /// A not-found module
    NotFound { module: M },
    /// An error module rendered directly with a message
    ErrorFallback { module: M, message: String },
}

impl<M> RenderNode<M> {
    /// Wrap `self` in `layouts`, given outermost first.
    pub fn wrap(self, layouts: Vec<M>, params: &Params) -> Self {
        layouts
            .into_iter()
            .rev()
            .fold(self, |child, module| RenderNode::Layout {
                module,
                params: params.clone(),
                child: Box::new(child),
            })
    }

    /// Direct child, if this node has one.
    pub fn child(&self) -> Option<&RenderNode<M>> {
        match self {
            RenderNode::Suspense { child, .. }
            | RenderNode::ErrorBoundary { child, .. }
            | RenderNode::Layout { child, .. } => Some(child),
            RenderNode::Page { .. }
            | RenderNode::NotFound { .. }
            | RenderNode::ErrorFallback { .. } => None,
        }
    }

    /// Wrapper modules from the root down, outermost first.
    pub fn layouts(&self) -> Vec<&M> {
        let mut out = Vec::new();
        let mut node = Some(self);
        while let Some(current) = node {
            if let RenderNode::Layout { module, .. } = current {
                out.push(module);
            }
            node = current.child();
        }
        out
    }

    /// The innermost node.
    pub fn leaf(&self) -> &RenderNode<M> {
        let mut node = self;
        while let Some(child) = node.child() {
            node = child;
        }
        node
    }
}

/// Modules loaded for a matched route.
#[derive(Debug, Clone)]
pub struct LoadedRoute<M> {
    pub page: M,
    pub layouts: Vec<M>,
    pub loading: Option<M>,
    pub error: Option<M>,
    pub params: Params,
}

/// Fold a loaded route into its render tree.
pub fn compose<M>(loaded: LoadedRoute<M>) -> RenderNode<M> {
    let LoadedRoute {
        page,
        layouts,
        loading,
        error,
        params,
    } = loaded;

    let mut node = RenderNode::Page {
        module: page,
        params: params.clone(),
    };
    if let Some(fallback) = loading {
        node = RenderNode::Suspense {
            fallback,
            child: Box::new(node),
        };
    }
    if let Some(fallback) = error {
        node = RenderNode::ErrorBoundary {
            fallback,
            params: params.clone(),
            child: Box::new(node),
        };
    }
    node.wrap(layouts, &params)
}

/// A not-found module inside its wrapper chain.
pub fn compose_not_found<M>(module: M, layouts: Vec<M>) -> RenderNode<M> {
    RenderNode::NotFound { module }.wrap(layouts, &Params::new())
}

/// An error module showing `message`, inside its wrapper chain.
pub fn compose_error<M>(module: M, message: String, layouts: Vec<M>, params: &Params) -> RenderNode<M> {
    RenderNode::ErrorFallback { module, message }.wrap(layouts, params)
}
