use yato::container::{dims, ArrayNd, ContainerCategory, ContainerNd, VectorNd};
use yato::Error;

#[test]
fn array_has_a_fixed_shape() {
    let a = ArrayNd::from_vec(dims([2, 3]), vec![1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(a.rank(), 2);
    assert_eq!(a.dimensions(), dims([2, 3]));
    assert_eq!(a.total_size(), 6);
    assert_eq!(*a.at(&[1, 2]).unwrap(), 6);
    assert!(matches!(a.at(&[2, 0]), Err(Error::OutOfRange(_))));

    assert!(ArrayNd::from_vec(dims([2, 3]), vec![0; 7]).is_err());

    let filled = ArrayNd::filled(dims([3]), 1u8);
    assert_eq!(filled.plain_iter().copied().collect::<Vec<_>>(), vec![1, 1, 1]);
}

#[test]
fn array_views_and_iteration() {
    let mut a = ArrayNd::from_vec(dims([2, 2]), vec![1, 2, 3, 4]).unwrap();

    let rows: Vec<Vec<i32>> = a
        .iter()
        .map(|row| row.plain_iter().copied().collect())
        .collect();
    assert_eq!(rows, vec![vec![1, 2], vec![3, 4]]);

    *a.at_mut(&[0, 1]).unwrap() = 20;
    assert_eq!(*a.sub(0).get(1), 20);

    for x in a.plain_iter_mut() {
        *x *= 10;
    }
    assert_eq!(*a.at(&[1, 1]).unwrap(), 40);
}

#[test]
fn proxies_report_their_layout() {
    let v = VectorNd::from_vec(dims([2, 3, 4]), (0..24).collect()).unwrap();
    let view = v.view();

    assert_eq!(view.rank(), 3);
    assert_eq!(view.dimensions(), dims([2, 3, 4]));
    assert_eq!(view.total_size(), 24);
    assert_eq!(view.total_stored(), 24);
    assert!(view.continuous());

    let plane = view.sub(1);
    assert_eq!(plane.rank(), 2);
    assert_eq!(plane.dimensions(), dims([3, 4]));
    assert_eq!(*plane.at(&[0, 0]).unwrap(), 12);

    let row = plane.sub(2);
    assert_eq!(row.rank(), 1);
    assert_eq!(*row.get(3), 23);
}

#[test]
fn mutable_proxies_write_through() {
    let mut v = VectorNd::from_vec(dims([2, 2]), vec![1, 2, 3, 4]).unwrap();

    {
        let mut view = v.view_mut();
        *view.at_mut(&[0, 0]).unwrap() = 10;
        let mut row = view.sub_mut(1);
        *row.get_mut(1) = 40;
    }
    assert_eq!(v.plain_iter().copied().collect::<Vec<_>>(), vec![10, 2, 3, 40]);

    {
        let mut view = v.view_mut();
        for mut row in view.iter_mut() {
            for x in row.plain_iter_mut() {
                *x += 1;
            }
        }
    }
    assert_eq!(v.plain_iter().copied().collect::<Vec<_>>(), vec![11, 3, 4, 41]);
}

#[test]
fn outer_iterator_is_double_ended_and_sized() {
    let v = VectorNd::from_vec(dims([3, 2]), (0..6).collect()).unwrap();
    let mut iter = v.iter();
    assert_eq!(iter.len(), 3);

    let back: Vec<i32> = iter.next_back().unwrap().plain_iter().copied().collect();
    assert_eq!(back, vec![4, 5]);

    let front: Vec<i32> = iter.next().unwrap().plain_iter().copied().collect();
    assert_eq!(front, vec![0, 1]);
    assert_eq!(iter.len(), 1);
}

#[test]
fn standard_containers_join_the_trait() {
    let v: Vec<i32> = vec![5, 6, 7];
    assert_eq!(ContainerNd::rank(&v), 1);
    assert_eq!(ContainerNd::total_size(&v), 3);
    assert_eq!(v.category(), ContainerCategory::Continuous);

    let s: &[i32] = &v;
    assert_eq!(ContainerNd::size(s, 0), 3);
    assert_eq!(ContainerNd::stride(s, 0), 1);
    assert!(ContainerNd::continuous(s));
}

#[test]
fn vectors_accept_any_container_as_sub_slice() {
    // push_back takes a plain Vec as a rank 1 sub-container
    let mut v = VectorNd::<i32>::empty(2);
    v.push_back(&vec![1, 2, 3]).unwrap();
    v.push_back(&vec![4, 5, 6]).unwrap();
    assert_eq!(v.dimensions(), dims([2, 3]));

    // ... and a proxy of a matching shape
    let other = VectorNd::from_vec(dims([2, 3]), (10..16).collect()).unwrap();
    v.push_back(&other.sub(0)).unwrap();
    assert_eq!(
        v.plain_iter().copied().collect::<Vec<_>>(),
        vec![1, 2, 3, 4, 5, 6, 10, 11, 12]
    );
}

#[test]
fn categories_classify_layouts() {
    let v = VectorNd::from_vec(dims([2, 2]), vec![0; 4]).unwrap();
    assert_eq!(ContainerNd::category(&v), ContainerCategory::Continuous);
    assert_eq!(v.view().category(), ContainerCategory::Continuous);

    let a = ArrayNd::filled(dims([2]), 0);
    assert_eq!(ContainerNd::category(&a), ContainerCategory::Continuous);
}
