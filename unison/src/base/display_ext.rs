use std::fmt;

/// Display an `Option<T>` as the value, or as the literal `None`.
pub(crate) struct DisplayOption<'a, T: fmt::Display>(pub &'a Option<T>);

impl<'a, T: fmt::Display> fmt::Display for DisplayOption<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(x) => write!(f, "{}", x),
            None => write!(f, "None"),
        }
    }
}

pub(crate) trait DisplayOptionExt<'a, T: fmt::Display> {
    fn display(&'a self) -> DisplayOption<'a, T>;
}

impl<'a, T> DisplayOptionExt<'a, T> for Option<T>
where T: fmt::Display
{
    fn display(&'a self) -> DisplayOption<'a, T> {
        DisplayOption(self)
    }
}
