use crate::backend::Kernels;
use crate::device::DeviceContext;
use crate::error::{Result, TensorError};
use crate::id::{IdCounter, TensorId};
use crate::shape::Shape;
use crate::storage::{Backend, DeviceStorage, Storage};

/// A dense, strided, single-precision tensor.
///
/// Holds row-major data on exactly one backend at a time (host memory or a
/// device buffer) with an associated shape, derived strides, and a
/// process-unique ID minted at construction. Numeric work is dispatched to a
/// [`Kernels`] implementation; backend transfers go through a
/// [`DeviceContext`].
///
/// Element access requires host residency: operations on a device-resident
/// tensor fail with [`TensorError::WrongBackend`] until the caller transfers
/// it back, except [`Tensor::format`], which reads through a staging download
/// without moving the tensor.
#[derive(Debug)]
pub struct Tensor {
    id: TensorId,
    shape: Shape,
    strides: Vec<usize>,
    storage: Storage,
}

impl Tensor {
    /// Create a zero-filled tensor with the given shape.
    ///
    /// # Errors
    /// Returns `InvalidShape` if the shape has rank 0.
    pub fn zeros(shape: Shape, ids: &IdCounter) -> Result<Tensor> {
        if shape.ndim() == 0 {
            return Err(TensorError::InvalidShape);
        }
        let data = vec![0.0; shape.numel()];
        Ok(Self::assemble(data, shape, ids))
    }

    /// Create a tensor filled with ones with the given shape.
    pub fn ones(shape: Shape, ids: &IdCounter) -> Result<Tensor> {
        if shape.ndim() == 0 {
            return Err(TensorError::InvalidShape);
        }
        let data = vec![1.0; shape.numel()];
        Ok(Self::assemble(data, shape, ids))
    }

    /// Create a tensor from existing data and a shape.
    ///
    /// # Errors
    /// Returns `InvalidShape` for a rank-0 shape, and `ShapeDataMismatch`
    /// when `data.len()` differs from the product of the dimensions.
    pub fn from_data(data: Vec<f32>, shape: Shape, ids: &IdCounter) -> Result<Tensor> {
        if shape.ndim() == 0 {
            return Err(TensorError::InvalidShape);
        }
        let expected = shape.numel();
        if data.len() != expected {
            return Err(TensorError::ShapeDataMismatch {
                shape: shape.dims().to_vec(),
                expected,
                got: data.len(),
            });
        }
        Ok(Self::assemble(data, shape, ids))
    }

    fn assemble(data: Vec<f32>, shape: Shape, ids: &IdCounter) -> Tensor {
        let strides = shape.strides();
        Tensor {
            id: ids.mint(),
            shape,
            strides,
            storage: Storage::Host(data),
        }
    }

    pub fn id(&self) -> TensorId {
        self.id
    }

    /// Rewrite this tensor's ID.
    ///
    /// Administrative override for the registry when re-homing a tensor under
    /// a new handle; the registry re-keys its index in the same step. Not
    /// part of the operation surface.
    pub fn reassign_id(&mut self, id: TensorId) {
        self.id = id;
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Total element count.
    pub fn size(&self) -> usize {
        self.shape.numel()
    }

    /// Which backend currently holds the authoritative data.
    pub fn backend(&self) -> Backend {
        self.storage.backend()
    }

    /// Returns the underlying storage reference.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Host view of the elements.
    ///
    /// # Errors
    /// Returns `WrongBackend` while the tensor is device-resident.
    pub fn data(&self) -> Result<&[f32]> {
        match &self.storage {
            Storage::Host(v) => Ok(v),
            Storage::Device(_) => Err(TensorError::WrongBackend {
                expected: Backend::Host,
                got: Backend::Device,
            }),
        }
    }

    fn data_mut(&mut self) -> Result<&mut [f32]> {
        match &mut self.storage {
            Storage::Host(v) => Ok(v),
            Storage::Device(_) => Err(TensorError::WrongBackend {
                expected: Backend::Host,
                got: Backend::Device,
            }),
        }
    }

    /// Translate a multi-dimensional index into a flat element offset.
    ///
    /// # Errors
    /// `RankMismatch` when the index arity differs from the rank, and
    /// `IndexOutOfRange` when any component falls outside its dimension.
    pub fn offset(&self, indices: &[usize]) -> Result<usize> {
        if indices.len() != self.shape.ndim() {
            return Err(TensorError::RankMismatch {
                expected: self.shape.ndim(),
                got: indices.len(),
            });
        }
        let mut offset = 0;
        for (axis, (&index, &stride)) in indices.iter().zip(self.strides.iter()).enumerate() {
            let dim = self.shape.dim(axis);
            if index >= dim {
                return Err(TensorError::IndexOutOfRange { axis, index, dim });
            }
            offset += index * stride;
        }
        Ok(offset)
    }

    /// Read one element by multi-dimensional index.
    pub fn get(&self, indices: &[usize]) -> Result<f32> {
        let offset = self.offset(indices)?;
        Ok(self.data()?[offset])
    }

    /// Write one element by multi-dimensional index.
    pub fn set(&mut self, indices: &[usize], value: f32) -> Result<()> {
        let offset = self.offset(indices)?;
        self.data_mut()?[offset] = value;
        Ok(())
    }

    fn check_same_shape(&self, other: &Tensor) -> Result<()> {
        if self.shape != other.shape {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: other.shape.dims().to_vec(),
            });
        }
        Ok(())
    }

    /// In-place element-wise multiplication: `self[i] *= other[i]`.
    pub fn elementwise_mul_(&mut self, other: &Tensor, kernels: &dyn Kernels) -> Result<()> {
        self.check_same_shape(other)?;
        kernels.mul_assign(self.data_mut()?, other.data()?)
    }

    /// In-place element-wise subtraction: `self[i] -= other[i]`.
    pub fn elementwise_sub_(&mut self, other: &Tensor, kernels: &dyn Kernels) -> Result<()> {
        self.check_same_shape(other)?;
        kernels.sub_assign(self.data_mut()?, other.data()?)
    }

    /// In-place multiplication by an incoming gradient (d(x*y)/dx = y).
    pub fn multiply_derivative_(&mut self, grad: &Tensor, kernels: &dyn Kernels) -> Result<()> {
        self.check_same_shape(grad)?;
        kernels.mul_assign(self.data_mut()?, grad.data()?)
    }

    /// Non-destructive element-wise addition.
    ///
    /// Allocates and returns a new tensor with a freshly minted ID; both
    /// operands are left unchanged.
    pub fn add(&self, other: &Tensor, kernels: &dyn Kernels, ids: &IdCounter) -> Result<Tensor> {
        self.check_same_shape(other)?;
        let data = kernels.add(self.data()?, other.data()?)?;
        Ok(Self::assemble(data, self.shape.clone(), ids))
    }

    /// Fused additive matrix product: `self += a @ b`.
    ///
    /// All three tensors must be rank 2, the inner dimensions of `a` and `b`
    /// must agree, and the product shape must equal `self`'s shape. Nothing
    /// is written to the receiver until every check has passed.
    pub fn add_matrix_multiply_(
        &mut self,
        a: &Tensor,
        b: &Tensor,
        kernels: &dyn Kernels,
    ) -> Result<()> {
        for t in [&*self, a, b] {
            if t.shape.ndim() != 2 {
                return Err(TensorError::RankMismatch {
                    expected: 2,
                    got: t.shape.ndim(),
                });
            }
        }

        let m = a.shape.dim(0);
        let k = a.shape.dim(1);
        let k2 = b.shape.dim(0);
        let n = b.shape.dim(1);
        if k != k2 {
            return Err(TensorError::MatmulMismatch { m, k, k2, n });
        }
        if self.shape.dims() != [m, n] {
            return Err(TensorError::ShapeMismatch {
                expected: vec![m, n],
                got: self.shape.dims().to_vec(),
            });
        }

        self.data()?;
        let product = kernels.matmul(a.data()?, b.data()?, m, k, n)?;
        kernels.add_assign(self.data_mut()?, &product)
    }

    /// In-place scalar multiplication: `self[i] *= s`.
    pub fn scalar_mul_(&mut self, s: f32, kernels: &dyn Kernels) -> Result<()> {
        kernels.scale_assign(self.data_mut()?, s);
        Ok(())
    }

    /// In-place scalar addition: `self[i] += s`.
    pub fn add_scalar_(&mut self, s: f32, kernels: &dyn Kernels) -> Result<()> {
        kernels.add_scalar_assign(self.data_mut()?, s);
        Ok(())
    }

    /// In-place zero fill.
    pub fn zero_(&mut self, kernels: &dyn Kernels) -> Result<()> {
        kernels.zero_assign(self.data_mut()?);
        Ok(())
    }

    /// In-place absolute value.
    pub fn abs_(&mut self, kernels: &dyn Kernels) -> Result<()> {
        kernels.abs_assign(self.data_mut()?);
        Ok(())
    }

    /// In-place negation.
    pub fn neg_(&mut self, kernels: &dyn Kernels) -> Result<()> {
        kernels.neg_assign(self.data_mut()?);
        Ok(())
    }

    /// Move the authoritative data to the device backend.
    ///
    /// Uploads the elements and the shape dims, then replaces the host
    /// storage. Idempotent when already device-resident.
    pub fn to_device(&mut self, device: &DeviceContext) -> Result<()> {
        if let Storage::Host(data) = &self.storage {
            let dims: Vec<i32> = self.shape.dims().iter().map(|&d| d as i32).collect();
            let storage = DeviceStorage {
                data: device.upload_f32(data),
                shape: device.upload_i32(&dims),
            };
            self.storage = Storage::Device(storage);
        }
        Ok(())
    }

    /// Move the authoritative data back to the host backend.
    ///
    /// Idempotent when already host-resident.
    pub fn to_host(&mut self, device: &DeviceContext) -> Result<()> {
        if let Storage::Device(ds) = &self.storage {
            let data = device.download_f32(&ds.data);
            self.storage = Storage::Host(data);
        }
        Ok(())
    }

    /// Owned copy of the elements regardless of residency.
    ///
    /// Host tensors copy directly; device tensors are read through a staging
    /// download, leaving the backend flag untouched. This is the sanctioned
    /// read path when the caller cannot (or should not) move the tensor.
    pub fn snapshot_data(&self, device: &DeviceContext) -> Vec<f32> {
        match &self.storage {
            Storage::Host(v) => v.clone(),
            Storage::Device(ds) => device.download_f32(&ds.data),
        }
    }

    /// Human-readable rendering of up to the last three dimensions.
    ///
    /// A device-resident tensor is read through a staging download; its
    /// backend flag does not change. Above rank 3 the leading block of the
    /// flattened buffer is printed beneath a truncation notice. This is a
    /// diagnostic affordance, not a wire format.
    pub fn format(&self, device: &DeviceContext) -> Result<String> {
        let data = self.snapshot_data(device);

        let rank = self.shape.ndim();
        let mut out = String::new();
        if rank > 3 {
            out.push_str("Only printing the last 3 dimensions\n");
        }
        let d1 = self.shape.dim(rank - 1);
        let d2 = if rank > 1 { self.shape.dim(rank - 2) } else { 1 };
        let d3 = if rank > 2 { self.shape.dim(rank - 3) } else { 1 };

        for k in 0..d3 {
            for j in 0..d2 {
                for i in 0..d1 {
                    out.push_str(&format!("{},\t", data[i + j * d1 + k * d1 * d2]));
                }
                out.push('\n');
            }
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::CpuKernels;
    use approx::assert_relative_eq;

    fn ids() -> IdCounter {
        IdCounter::new()
    }

    #[test]
    fn test_zeros() {
        let ids = ids();
        let t = Tensor::zeros(Shape::new(vec![2, 3]), &ids).unwrap();
        assert_eq!(t.size(), 6);
        assert_eq!(t.strides(), &[3, 1]);
        assert_eq!(t.backend(), Backend::Host);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(t.get(&[i, j]).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_from_data_row_major() {
        let ids = ids();
        let t = Tensor::from_data(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            Shape::new(vec![2, 3]),
            &ids,
        )
        .unwrap();
        assert_eq!(t.get(&[0, 0]).unwrap(), 1.0);
        assert_eq!(t.get(&[0, 2]).unwrap(), 3.0);
        assert_eq!(t.get(&[1, 0]).unwrap(), 4.0);
        assert_eq!(t.get(&[1, 2]).unwrap(), 6.0);
    }

    #[test]
    fn test_from_data_mismatch() {
        let ids = ids();
        let err = Tensor::from_data(vec![1.0, 2.0], Shape::new(vec![3]), &ids).unwrap_err();
        assert!(matches!(err, TensorError::ShapeDataMismatch { .. }));
    }

    #[test]
    fn test_empty_shape_rejected() {
        let ids = ids();
        assert!(matches!(
            Tensor::zeros(Shape::new(vec![]), &ids),
            Err(TensorError::InvalidShape)
        ));
        assert!(matches!(
            Tensor::from_data(vec![1.0], Shape::new(vec![]), &ids),
            Err(TensorError::InvalidShape)
        ));
    }

    #[test]
    fn test_index_out_of_range_each_axis() {
        let ids = ids();
        let t = Tensor::zeros(Shape::new(vec![2, 3]), &ids).unwrap();
        assert!(matches!(
            t.get(&[2, 0]),
            Err(TensorError::IndexOutOfRange { axis: 0, .. })
        ));
        assert!(matches!(
            t.get(&[0, 3]),
            Err(TensorError::IndexOutOfRange { axis: 1, .. })
        ));
    }

    #[test]
    fn test_index_rank_mismatch() {
        let ids = ids();
        let t = Tensor::zeros(Shape::new(vec![2, 3]), &ids).unwrap();
        assert!(matches!(
            t.get(&[1]),
            Err(TensorError::RankMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            t.get(&[1, 1, 1]),
            Err(TensorError::RankMismatch { expected: 2, got: 3 })
        ));
    }

    #[test]
    fn test_set_get() {
        let ids = ids();
        let mut t = Tensor::zeros(Shape::new(vec![2, 2]), &ids).unwrap();
        t.set(&[1, 0], 7.5).unwrap();
        assert_eq!(t.get(&[1, 0]).unwrap(), 7.5);
        assert_eq!(t.data().unwrap(), &[0.0, 0.0, 7.5, 0.0]);
    }

    #[test]
    fn test_ids_strictly_increasing() {
        let ids = ids();
        let a = Tensor::zeros(Shape::new(vec![1]), &ids).unwrap();
        let b = Tensor::zeros(Shape::new(vec![1]), &ids).unwrap();
        let c = Tensor::zeros(Shape::new(vec![1]), &ids).unwrap();
        assert!(a.id() < b.id());
        assert!(b.id() < c.id());
    }

    #[test]
    fn test_elementwise_mul_in_place() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut t =
            Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]), &ids).unwrap();
        let o =
            Tensor::from_data(vec![2.0, 2.0, 2.0, 2.0], Shape::new(vec![2, 2]), &ids).unwrap();
        t.elementwise_mul_(&o, &k).unwrap();
        assert_eq!(t.data().unwrap(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(o.data().unwrap(), &[2.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_elementwise_sub_in_place() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut t = Tensor::from_data(vec![5.0, 6.0], Shape::new(vec![2]), &ids).unwrap();
        let o = Tensor::from_data(vec![1.0, 2.0], Shape::new(vec![2]), &ids).unwrap();
        t.elementwise_sub_(&o, &k).unwrap();
        assert_eq!(t.data().unwrap(), &[4.0, 4.0]);
    }

    #[test]
    fn test_binary_shape_mismatch() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut t = Tensor::zeros(Shape::new(vec![2, 2]), &ids).unwrap();
        let o = Tensor::zeros(Shape::new(vec![4]), &ids).unwrap();
        assert!(matches!(
            t.elementwise_mul_(&o, &k),
            Err(TensorError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            t.add(&o, &k, &ids),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_add_allocates_new_tensor() {
        let ids = ids();
        let k = CpuKernels::new();
        let a =
            Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]), &ids).unwrap();
        let b =
            Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]), &ids).unwrap();
        let c = a.add(&b, &k, &ids).unwrap();

        assert_eq!(c.data().unwrap(), &[2.0, 4.0, 6.0, 8.0]);
        assert_eq!(c.shape().dims(), &[2, 2]);
        assert!(c.id() > b.id());
        // operands untouched
        assert_eq!(a.data().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(b.data().unwrap(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_add_matrix_multiply() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut acc =
            Tensor::from_data(vec![1.0, 1.0, 1.0, 1.0], Shape::new(vec![2, 2]), &ids).unwrap();
        let a =
            Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]), &ids).unwrap();
        let b =
            Tensor::from_data(vec![5.0, 6.0, 7.0, 8.0], Shape::new(vec![2, 2]), &ids).unwrap();
        acc.add_matrix_multiply_(&a, &b, &k).unwrap();
        // 1 + [19,22;43,50]
        assert_eq!(acc.data().unwrap(), &[20.0, 23.0, 44.0, 51.0]);
    }

    #[test]
    fn test_add_matrix_multiply_inner_dim_mismatch() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut acc = Tensor::zeros(Shape::new(vec![1, 2]), &ids).unwrap();
        let a = Tensor::zeros(Shape::new(vec![1, 3]), &ids).unwrap();
        let b = Tensor::zeros(Shape::new(vec![2, 2]), &ids).unwrap();
        assert!(matches!(
            acc.add_matrix_multiply_(&a, &b, &k),
            Err(TensorError::MatmulMismatch { .. })
        ));
    }

    #[test]
    fn test_add_matrix_multiply_rank_and_result_shape() {
        let ids = ids();
        let k = CpuKernels::new();

        let mut acc = Tensor::zeros(Shape::new(vec![4]), &ids).unwrap();
        let a = Tensor::zeros(Shape::new(vec![2, 2]), &ids).unwrap();
        let b = Tensor::zeros(Shape::new(vec![2, 2]), &ids).unwrap();
        assert!(matches!(
            acc.add_matrix_multiply_(&a, &b, &k),
            Err(TensorError::RankMismatch { expected: 2, .. })
        ));

        let mut acc = Tensor::zeros(Shape::new(vec![3, 3]), &ids).unwrap();
        let before = acc.data().unwrap().to_vec();
        assert!(matches!(
            acc.add_matrix_multiply_(&a, &b, &k),
            Err(TensorError::ShapeMismatch { .. })
        ));
        assert_eq!(acc.data().unwrap(), before.as_slice());
    }

    #[test]
    fn test_scalar_ops() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut t =
            Tensor::from_data(vec![1.0, 2.0, 3.0, 4.0], Shape::new(vec![2, 2]), &ids).unwrap();

        t.scalar_mul_(2.0, &k).unwrap();
        assert_eq!(t.data().unwrap(), &[2.0, 4.0, 6.0, 8.0]);

        t.add_scalar_(1.0, &k).unwrap();
        assert_eq!(t.data().unwrap(), &[3.0, 5.0, 7.0, 9.0]);

        t.zero_(&k).unwrap();
        assert_eq!(t.data().unwrap(), &[0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unary_ops() {
        let ids = ids();
        let k = CpuKernels::new();
        let mut t = Tensor::from_data(vec![-1.5, 2.5], Shape::new(vec![2]), &ids).unwrap();

        t.abs_(&k).unwrap();
        assert_relative_eq!(t.get(&[0]).unwrap(), 1.5);

        t.neg_(&k).unwrap();
        assert_eq!(t.data().unwrap(), &[-1.5, -2.5]);
    }

    #[test]
    fn test_transfer_round_trip_bit_identical() {
        let ids = ids();
        let device = DeviceContext::new();
        let values = vec![1.0f32, -0.0, f32::MIN_POSITIVE, 3.25e-7, 12345.678];
        let mut t = Tensor::from_data(values.clone(), Shape::new(vec![5]), &ids).unwrap();

        t.to_device(&device).unwrap();
        assert_eq!(t.backend(), Backend::Device);
        assert!(matches!(t.data(), Err(TensorError::WrongBackend { .. })));

        t.to_host(&device).unwrap();
        assert_eq!(t.backend(), Backend::Host);
        let round_tripped = t.data().unwrap();
        for (a, b) in round_tripped.iter().zip(values.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_transfer_uploads_parallel_shape_buffer() {
        let ids = ids();
        let device = DeviceContext::new();
        let mut t = Tensor::zeros(Shape::new(vec![2, 3]), &ids).unwrap();
        t.to_device(&device).unwrap();

        match t.storage() {
            Storage::Device(ds) => {
                assert_eq!(ds.data_buffer().byte_len(), 6 * 4);
                assert_eq!(device.download_i32(ds.shape_buffer()), vec![2, 3]);
            }
            Storage::Host(_) => panic!("expected device storage"),
        }
    }

    #[test]
    fn test_transfer_idempotent() {
        let ids = ids();
        let device = DeviceContext::new();
        let mut t = Tensor::from_data(vec![1.0], Shape::new(vec![1]), &ids).unwrap();

        t.to_host(&device).unwrap();
        assert_eq!(t.backend(), Backend::Host);

        t.to_device(&device).unwrap();
        let buffers = device.buffers_created();
        t.to_device(&device).unwrap();
        assert_eq!(device.buffers_created(), buffers);
    }

    #[test]
    fn test_device_resident_op_rejected() {
        let ids = ids();
        let k = CpuKernels::new();
        let device = DeviceContext::new();
        let mut t = Tensor::from_data(vec![1.0, 2.0], Shape::new(vec![2]), &ids).unwrap();
        t.to_device(&device).unwrap();
        assert!(matches!(
            t.scalar_mul_(2.0, &k),
            Err(TensorError::WrongBackend { .. })
        ));
    }

    #[test]
    fn test_format_rank_two() {
        let ids = ids();
        let device = DeviceContext::new();
        let t = Tensor::from_data(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            Shape::new(vec![2, 3]),
            &ids,
        )
        .unwrap();
        assert_eq!(t.format(&device).unwrap(), "1,\t2,\t3,\t\n4,\t5,\t6,\t\n\n");
    }

    #[test]
    fn test_format_rank_one() {
        let ids = ids();
        let device = DeviceContext::new();
        let t = Tensor::from_data(vec![1.5, 2.5], Shape::new(vec![2]), &ids).unwrap();
        assert_eq!(t.format(&device).unwrap(), "1.5,\t2.5,\t\n\n");
    }

    #[test]
    fn test_format_rank_three_blocks() {
        let ids = ids();
        let device = DeviceContext::new();
        let t = Tensor::from_data(
            (1..=8).map(|v| v as f32).collect(),
            Shape::new(vec![2, 2, 2]),
            &ids,
        )
        .unwrap();
        assert_eq!(
            t.format(&device).unwrap(),
            "1,\t2,\t\n3,\t4,\t\n\n5,\t6,\t\n7,\t8,\t\n\n"
        );
    }

    #[test]
    fn test_format_rank_four_truncates() {
        let ids = ids();
        let device = DeviceContext::new();
        let t = Tensor::zeros(Shape::new(vec![2, 1, 1, 2]), &ids).unwrap();
        let out = t.format(&device).unwrap();
        assert!(out.starts_with("Only printing the last 3 dimensions\n"));
        assert_eq!(out, "Only printing the last 3 dimensions\n0,\t0,\t\n\n");
    }

    #[test]
    fn test_format_device_resident_stages_without_moving() {
        let ids = ids();
        let device = DeviceContext::new();
        let mut t = Tensor::from_data(vec![1.0, 2.0], Shape::new(vec![2]), &ids).unwrap();
        t.to_device(&device).unwrap();

        let out = t.format(&device).unwrap();
        assert_eq!(out, "1,\t2,\t\n\n");
        assert_eq!(t.backend(), Backend::Device);
    }
}
