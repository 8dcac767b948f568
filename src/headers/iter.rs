use super::{HeaderField, HeaderMap};

impl<'a> IntoIterator for &'a HeaderMap {
    type Item = <Iter<'a> as Iterator>::Item;

    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over header `(name, value)` pairs in insertion order.
#[derive(Debug)]
pub struct Iter<'a> {
    iter: std::slice::Iter<'a, HeaderField>,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(fields: &'a [HeaderField]) -> Self {
        Self {
            iter: fields.iter(),
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|field| (field.name(), field.value()))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> { }

/// Iterator over every value of a single header name.
#[derive(Debug)]
pub struct GetAll<'a> {
    name: &'a str,
    iter: std::slice::Iter<'a, HeaderField>,
}

impl<'a> GetAll<'a> {
    pub(crate) fn new(name: &'a str, fields: &'a [HeaderField]) -> Self {
        Self {
            name,
            iter: fields.iter(),
        }
    }
}

impl<'a> Iterator for GetAll<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let name = self.name;
        self.iter.find(|field| field.is(name)).map(HeaderField::value)
    }
}
