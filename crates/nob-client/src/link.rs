//! Anchor click interception policy.

use url::Url;

/// What the navigator knows about a click on an anchor.
#[derive(Debug, Clone, Default)]
pub struct LinkClick<'a> {
    /// Raw `href` attribute
    pub href: &'a str,
    /// Mouse button (0 = primary)
    pub button: u16,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    /// `target` attribute, if present
    pub target: Option<&'a str>,
    /// Whether the anchor has a `download` attribute
    pub download: bool,
    /// Whether another handler already called `preventDefault`
    pub default_prevented: bool,
}

/// Outcome of [`intercept_link`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkDecision {
    /// Handle client-side; the value is path + query + fragment
    Navigate(String),
    /// Let the browser handle the click
    FallThrough,
}

/// Decide whether a click should become a client-side navigation.
///
/// Only unmodified primary-button clicks on same-origin, untargeted,
/// non-download anchors are intercepted.
pub fn intercept_link(click: &LinkClick<'_>, current: &Url) -> LinkDecision {
    if click.default_prevented
        || click.button != 0
        || click.ctrl_key
        || click.meta_key
        || click.shift_key
        || click.alt_key
        || click.download
    {
        return LinkDecision::FallThrough;
    }

    if let Some(target) = click.target {
        if !target.is_empty() && target != "_self" {
            return LinkDecision::FallThrough;
        }
    }

    let Ok(resolved) = current.join(click.href) else {
        return LinkDecision::FallThrough;
    };
    if resolved.origin() != current.origin() {
        return LinkDecision::FallThrough;
    }

    let mut href = resolved.path().to_string();
    if let Some(query) = resolved.query() {
        href.push('?');
        href.push_str(query);
    }
    if let Some(fragment) = resolved.fragment() {
        href.push('#');
        href.push_str(fragment);
    }
    LinkDecision::Navigate(href)
}
