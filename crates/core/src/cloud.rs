use crate::{PointXYZ, Rgb};

/// A point cloud stored as structure-of-arrays.
///
/// Optional per-point attributes (`normals`, `colors`) are always either
/// absent or exactly as long as the coordinate arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub z: Vec<f32>,
    pub normals: Option<Normals>,
    pub colors: Option<Colors>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Normals {
    pub nx: Vec<f32>,
    pub ny: Vec<f32>,
    pub nz: Vec<f32>,
}

impl Normals {
    /// Returns the number of normals.
    pub fn len(&self) -> usize {
        self.nx.len()
    }

    /// Returns true if there are no normals.
    pub fn is_empty(&self) -> bool {
        self.nx.is_empty()
    }

    /// Returns the `i`-th normal.
    pub fn get(&self, i: usize) -> [f32; 3] {
        [self.nx[i], self.ny[i], self.nz[i]]
    }

    pub fn to_vec(&self) -> Vec<[f32; 3]> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colors {
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl Colors {
    /// `len` copies of `color`.
    pub fn filled(len: usize, color: Rgb) -> Self {
        Self {
            r: vec![color.r; len],
            g: vec![color.g; len],
            b: vec![color.b; len],
        }
    }

    /// Returns the number of colors.
    pub fn len(&self) -> usize {
        self.r.len()
    }

    /// Returns true if there are no colors.
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }

    /// Returns the color of point `i`.
    pub fn get(&self, i: usize) -> Rgb {
        Rgb::new(self.r[i], self.g[i], self.b[i])
    }

    /// Overwrites the color of point `i`.
    pub fn set(&mut self, i: usize, color: Rgb) {
        self.r[i] = color.r;
        self.g[i] = color.g;
        self.b[i] = color.b;
    }

    pub fn push(&mut self, color: Rgb) {
        self.r.push(color.r);
        self.g.push(color.g);
        self.b.push(color.b);
    }

    pub fn iter(&self) -> impl Iterator<Item = Rgb> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

impl PointCloud {
    pub fn new() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            z: Vec::new(),
            normals: None,
            colors: None,
        }
    }

    pub fn from_xyz(x: Vec<f32>, y: Vec<f32>, z: Vec<f32>) -> Self {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        assert_eq!(x.len(), z.len(), "x and z must have same length");

        Self {
            x,
            y,
            z,
            normals: None,
            colors: None,
        }
    }

    pub fn from_points(points: &[[f32; 3]]) -> Self {
        let mut cloud = Self::new();
        cloud.x.reserve(points.len());
        cloud.y.reserve(points.len());
        cloud.z.reserve(points.len());
        for p in points {
            cloud.x.push(p[0]);
            cloud.y.push(p[1]);
            cloud.z.push(p[2]);
        }
        cloud
    }

    /// Returns the number of points.
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.x.len(), self.y.len());
        debug_assert_eq!(self.x.len(), self.z.len());
        self.x.len()
    }

    /// Returns true if the cloud has no points.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Returns the coordinates of point `i`.
    pub fn point(&self, i: usize) -> [f32; 3] {
        [self.x[i], self.y[i], self.z[i]]
    }

    /// Returns point `i` as a [`PointXYZ`].
    pub fn point_xyz(&self, i: usize) -> PointXYZ {
        PointXYZ::new(self.x[i], self.y[i], self.z[i])
    }

    /// Iterates over point coordinates in order.
    pub fn iter_points(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| [*x, *y, *z])
    }

    /// Appends a colored point.
    ///
    /// # Panics
    ///
    /// Panics if the cloud carries normals, or carries no colors while
    /// being non-empty: either would break the attribute length invariant.
    pub fn push_colored(&mut self, point: [f32; 3], color: Rgb) {
        assert!(
            self.normals.is_none(),
            "push_colored on a cloud with normals"
        );
        if self.colors.is_none() {
            assert!(self.is_empty(), "push_colored on an uncolored cloud");
            self.colors = Some(Colors::filled(0, color));
        }
        self.x.push(point[0]);
        self.y.push(point[1]);
        self.z.push(point[2]);
        if let Some(colors) = self.colors.as_mut() {
            colors.push(color);
        }
    }

    /// Returns a copy of the coordinates with every point set to `color`.
    /// Normals are not carried over.
    pub fn painted(&self, color: Rgb) -> Self {
        Self {
            x: self.x.clone(),
            y: self.y.clone(),
            z: self.z.clone(),
            normals: None,
            colors: Some(Colors::filled(self.len(), color)),
        }
    }

    /// Returns a new cloud with the points at `indices`, in that order,
    /// carrying normals and colors along.
    ///
    /// # Panics
    ///
    /// Panics if any index in `indices` is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Self {
        let mut x = Vec::with_capacity(indices.len());
        let mut y = Vec::with_capacity(indices.len());
        let mut z = Vec::with_capacity(indices.len());

        for &idx in indices {
            assert!(idx < self.len(), "index out of bounds in select");
            x.push(self.x[idx]);
            y.push(self.y[idx]);
            z.push(self.z[idx]);
        }

        let normals = self.normals.as_ref().map(|n| Normals {
            nx: indices.iter().map(|&idx| n.nx[idx]).collect(),
            ny: indices.iter().map(|&idx| n.ny[idx]).collect(),
            nz: indices.iter().map(|&idx| n.nz[idx]).collect(),
        });

        let colors = self.colors.as_ref().map(|c| Colors {
            r: indices.iter().map(|&idx| c.r[idx]).collect(),
            g: indices.iter().map(|&idx| c.g[idx]).collect(),
            b: indices.iter().map(|&idx| c.b[idx]).collect(),
        });

        Self {
            x,
            y,
            z,
            normals,
            colors,
        }
    }

    pub fn to_points(&self) -> Vec<[f32; 3]> {
        self.iter_points().collect()
    }
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new()
    }
}
